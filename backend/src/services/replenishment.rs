//! Replenishment engine: forecast-driven reorder suggestions
//!
//! A generation run reads sales velocity and writes its whole batch inside a
//! single transaction, so a run is either fully visible or not at all.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::ReplenishmentConfig;
use crate::error::{validate_named, AppError, AppResult};
use crate::models::{ReplenishmentSuggestion, SuggestionRow};
use shared::{
    plan_generation, ForecastParams, OpenSuggestion, Pagination, RegenerationPolicy,
    SalesVelocity, SuggestionAction, SuggestionDraft,
};

/// Replenishment service
#[derive(Clone)]
pub struct ReplenishmentService {
    db: PgPool,
    defaults: ReplenishmentConfig,
}

/// Optional overrides for one generation run
#[derive(Debug, Default, Deserialize)]
pub struct GenerateInput {
    pub lookback_days: Option<i32>,
    pub forecast_days: Option<i32>,
    pub safety_stock_factor: Option<Decimal>,
    pub regeneration_policy: Option<RegenerationPolicy>,
}

/// Outcome of a generation run
#[derive(Debug, Serialize)]
pub struct GenerationResult {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub params: ForecastParams,
    pub regeneration_policy: RegenerationPolicy,
    pub products_scanned: usize,
    pub superseded: usize,
    pub suggestions: Vec<SuggestionDraft>,
}

/// Listing filters
#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

impl Default for SuggestionQuery {
    fn default() -> Self {
        Self { active_only: true }
    }
}

fn default_active_only() -> bool {
    true
}

/// User action on a suggestion
#[derive(Debug, Deserialize)]
pub struct SuggestionActionInput {
    pub suggestion_id: Uuid,
    pub action: String,
}

#[derive(Debug, FromRow)]
struct VelocityRow {
    sku: String,
    current_stock: i32,
    units_sold: i64,
}

#[derive(Debug, FromRow)]
struct OpenSuggestionRow {
    id: Uuid,
    product_sku: String,
}

impl ReplenishmentService {
    /// Create a new ReplenishmentService instance
    pub fn new(db: PgPool, defaults: &ReplenishmentConfig) -> Self {
        Self {
            db,
            defaults: defaults.clone(),
        }
    }

    /// Resolve run parameters: request overrides on top of configured defaults
    pub fn resolve_params(&self, input: &GenerateInput) -> AppResult<(ForecastParams, RegenerationPolicy)> {
        let defaults = self.defaults.default_params();
        let params = ForecastParams {
            lookback_days: input.lookback_days.unwrap_or(defaults.lookback_days),
            forecast_days: input.forecast_days.unwrap_or(defaults.forecast_days),
            safety_stock_factor: input
                .safety_stock_factor
                .unwrap_or(defaults.safety_stock_factor),
        };
        validate_named(params.validate())?;

        let policy = input
            .regeneration_policy
            .unwrap_or(self.defaults.regeneration_policy);
        Ok((params, policy))
    }

    /// Run one generation batch
    pub async fn generate(&self, input: GenerateInput) -> AppResult<GenerationResult> {
        let (params, policy) = self.resolve_params(&input)?;
        let batch_id = Uuid::new_v4();

        let mut tx = self.db.begin().await?;

        let velocities: Vec<SalesVelocity> = sqlx::query_as::<_, VelocityRow>(
            r#"
            SELECT p.sku, p.quantity_in_stock AS current_stock,
                   COALESCE(SUM(m.quantity), 0)::BIGINT AS units_sold
            FROM products p
            LEFT JOIN stock_movements m
                   ON m.product_sku = p.sku
                  AND m.movement_type = 'sale'
                  AND m.created_at >= NOW() - make_interval(days => $1)
            WHERE p.status = 'active'
            GROUP BY p.sku, p.quantity_in_stock
            ORDER BY p.sku
            "#,
        )
        .bind(params.lookback_days)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| SalesVelocity {
            sku: row.sku,
            current_stock: row.current_stock,
            units_sold: row.units_sold,
        })
        .collect();

        let open: Vec<OpenSuggestion> = match policy {
            RegenerationPolicy::Additive => Vec::new(),
            RegenerationPolicy::SupersedeUnacted => sqlx::query_as::<_, OpenSuggestionRow>(
                r#"
                SELECT id, product_sku
                FROM replenishment_suggestions
                WHERE NOT is_acted_upon
                FOR UPDATE
                "#,
            )
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| OpenSuggestion {
                id: row.id,
                sku: row.product_sku,
            })
            .collect(),
        };

        let plan = plan_generation(&velocities, &open, &params, policy)?;

        if !plan.supersede.is_empty() {
            sqlx::query("DELETE FROM replenishment_suggestions WHERE id = ANY($1)")
                .bind(&plan.supersede)
                .execute(&mut *tx)
                .await?;
        }

        let generated_at = Utc::now();
        for draft in &plan.drafts {
            sqlx::query(
                r#"
                INSERT INTO replenishment_suggestions (
                    batch_id, product_sku, forecasted_demand, current_stock,
                    suggested_quantity, date_generated
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(batch_id)
            .bind(&draft.sku)
            .bind(draft.forecasted_demand)
            .bind(draft.current_stock)
            .bind(draft.suggested_quantity)
            .bind(generated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            batch_id = %batch_id,
            scanned = velocities.len(),
            superseded = plan.supersede.len(),
            generated = plan.drafts.len(),
            "Replenishment suggestions generated"
        );

        Ok(GenerationResult {
            batch_id,
            generated_at,
            params,
            regeneration_policy: policy,
            products_scanned: velocities.len(),
            superseded: plan.supersede.len(),
            suggestions: plan.drafts,
        })
    }

    /// List suggestions, newest run first, largest orders first within a run
    pub async fn list_suggestions(
        &self,
        query: SuggestionQuery,
        page: Pagination,
    ) -> AppResult<Vec<ReplenishmentSuggestion>> {
        let rows = sqlx::query_as::<_, SuggestionRow>(
            r#"
            SELECT s.id, s.batch_id, s.product_sku, p.name AS product_name,
                   p.barcode AS product_barcode, s.forecasted_demand, s.current_stock,
                   s.suggested_quantity, s.date_generated, s.is_acted_upon, s.acted_upon_at
            FROM replenishment_suggestions s
            JOIN products p ON p.sku = s.product_sku
            WHERE ($1 = FALSE OR s.is_acted_upon = FALSE)
            ORDER BY s.date_generated DESC, s.suggested_quantity DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.active_only)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ReplenishmentSuggestion::from).collect())
    }

    /// Apply an accept or ignore action
    pub async fn apply_action(&self, input: SuggestionActionInput) -> AppResult<String> {
        let action: SuggestionAction = input
            .action
            .parse()
            .map_err(|message: String| AppError::validation("action", message))?;

        let message = match action {
            SuggestionAction::Accept => {
                self.accept(input.suggestion_id).await?;
                "Suggestion accepted successfully"
            }
            SuggestionAction::Ignore => {
                self.ignore(input.suggestion_id).await?;
                "Suggestion ignored successfully"
            }
        };

        tracing::info!(suggestion_id = %input.suggestion_id, action = %action, "Suggestion updated");
        Ok(message.to_string())
    }

    /// Mark a suggestion as acted upon
    pub async fn accept(&self, suggestion_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE replenishment_suggestions
            SET is_acted_upon = TRUE, acted_upon_at = COALESCE(acted_upon_at, NOW())
            WHERE id = $1
            "#,
        )
        .bind(suggestion_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Suggestion".to_string()));
        }
        Ok(())
    }

    /// Remove a suggestion
    pub async fn ignore(&self, suggestion_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM replenishment_suggestions WHERE id = $1")
            .bind(suggestion_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Suggestion".to_string()));
        }
        Ok(())
    }
}
