use anyhow::Context;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AnalysisReport, Insight, SegmentBucket, SegmentCategory, StoredAnalysis};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Stores `report` and makes it the current analysis, replacing the previous one.
pub async fn save_analysis(
    pool: &PgPool,
    source: &str,
    report: &AnalysisReport,
) -> anyhow::Result<Uuid> {
    let snapshot_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE campus_insights.analysis_snapshots SET is_current = FALSE WHERE is_current",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO campus_insights.analysis_snapshots
        (id, source, total_students, segments_created, is_current)
        VALUES ($1, $2, $3, $4, TRUE)
        "#,
    )
    .bind(snapshot_id)
    .bind(source)
    .bind(i64::try_from(report.total_students).context("total_students out of range")?)
    .bind(i32::try_from(report.segments_created).context("segments_created out of range")?)
    .execute(&mut *tx)
    .await?;

    for category in SegmentCategory::ALL {
        for (position, bucket) in report.buckets(category).iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO campus_insights.segment_buckets
                (snapshot_id, category, position, name, count, percentage)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(snapshot_id)
            .bind(category.key())
            .bind(i32::try_from(position)?)
            .bind(&bucket.name)
            .bind(i64::try_from(bucket.count).context("bucket count out of range")?)
            .bind(bucket.percentage)
            .execute(&mut *tx)
            .await?;
        }
    }

    for (position, insight) in report.insights.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO campus_insights.snapshot_insights
            (snapshot_id, position, icon, title, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(snapshot_id)
        .bind(i32::try_from(position)?)
        .bind(&insight.icon)
        .bind(&insight.title)
        .bind(&insight.description)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(%snapshot_id, source, "analysis snapshot saved as current");
    Ok(snapshot_id)
}

pub async fn fetch_current_analysis(pool: &PgPool) -> anyhow::Result<Option<StoredAnalysis>> {
    let Some(row) = sqlx::query(
        r#"
        SELECT id, source, total_students, segments_created, created_at
        FROM campus_insights.analysis_snapshots
        WHERE is_current
        "#,
    )
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let snapshot_id: Uuid = row.get("id");
    let total_students: i64 = row.get("total_students");
    let segments_created: i32 = row.get("segments_created");

    let mut report = AnalysisReport::empty();
    report.total_students = u64::try_from(total_students)?;
    report.segments_created = u32::try_from(segments_created)?;

    let buckets = sqlx::query(
        r#"
        SELECT category, name, count, percentage
        FROM campus_insights.segment_buckets
        WHERE snapshot_id = $1
        ORDER BY category, position
        "#,
    )
    .bind(snapshot_id)
    .fetch_all(pool)
    .await?;

    for bucket in buckets {
        let key: String = bucket.get("category");
        let Some(category) = SegmentCategory::from_key(&key) else {
            tracing::warn!(category = %key, %snapshot_id, "skipping bucket with unknown category");
            continue;
        };
        let count: i64 = bucket.get("count");
        report.buckets_mut(category).push(SegmentBucket {
            name: bucket.get("name"),
            count: u64::try_from(count)?,
            percentage: bucket.get("percentage"),
            color: None,
        });
    }

    let insights = sqlx::query(
        r#"
        SELECT icon, title, description
        FROM campus_insights.snapshot_insights
        WHERE snapshot_id = $1
        ORDER BY position
        "#,
    )
    .bind(snapshot_id)
    .fetch_all(pool)
    .await?;

    report.insights = insights
        .into_iter()
        .map(|insight| Insight {
            icon: insight.get("icon"),
            title: insight.get("title"),
            description: insight.get("description"),
        })
        .collect();

    Ok(Some(StoredAnalysis {
        id: snapshot_id,
        source: row.get("source"),
        created_at: row.get("created_at"),
        report,
    }))
}
