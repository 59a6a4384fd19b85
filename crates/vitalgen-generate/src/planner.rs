use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vitalgen_core::{Error as CoreError, FieldCatalog, FieldPercentage, Operator};

use crate::constraint::{Constraint, ConstraintFactory, pick_operator};
use crate::errors::GenerationError;
use crate::sampler::ValueSampler;
use crate::subscription::Subscription;

/// Caller input for one subscription generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Number of subscriptions to emit.
    pub count: i64,
    /// Requested share of subscriptions touching each listed field.
    ///
    /// Values outside 0-100 are floored as-is; negative shares yield no
    /// constraints and a field's quota never exceeds 100 times `count`.
    /// Everything past `count` is dropped during packing.
    pub field_percentages: Vec<FieldPercentage>,
    /// Field whose bucket gets a forced share of `=` constraints.
    pub equality_target: FieldPercentage,
}

impl GenerationRequest {
    pub fn new(
        count: i64,
        field_percentages: Vec<FieldPercentage>,
        equality_target: FieldPercentage,
    ) -> Self {
        Self {
            count,
            field_percentages,
            equality_target,
        }
    }

    /// Check the request against `catalog` and return the usable count.
    ///
    /// Percentages themselves are not range-checked.
    pub fn validate(&self, catalog: &FieldCatalog) -> Result<usize, GenerationError> {
        let count =
            usize::try_from(self.count).map_err(|_| CoreError::InvalidCount(self.count))?;
        for entry in &self.field_percentages {
            catalog.require(&entry.field)?;
        }
        catalog.require(&self.equality_target.field)?;
        Ok(count)
    }
}

/// Per-field statistics of a planning pass, taken before packing drops
/// duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub field: String,
    /// `None` for filler fields that received a random share.
    pub requested_percentage: Option<f64>,
    pub generated: usize,
    pub equality: usize,
    pub placed: usize,
}

/// Output of the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionPlan {
    pub subscriptions: Vec<Subscription>,
    pub buckets: Vec<BucketSummary>,
    pub dropped_duplicates: usize,
}

impl SubscriptionPlan {
    pub fn bucket(&self, field: &str) -> Option<&BucketSummary> {
        self.buckets.iter().find(|bucket| bucket.field == field)
    }

    pub fn into_subscriptions(self) -> Vec<Subscription> {
        self.subscriptions
    }
}

struct FieldBucket {
    field: String,
    requested_percentage: Option<f64>,
    constraints: Vec<Constraint>,
    equality: usize,
}

/// Synthesizes subscriptions matching per-field participation percentages.
#[derive(Debug, Clone, Copy)]
pub struct DistributionPlanner<'a> {
    catalog: &'a FieldCatalog,
    factory: ConstraintFactory<'a>,
}

impl<'a> DistributionPlanner<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self {
            catalog,
            factory: ConstraintFactory::new(ValueSampler::new(catalog)),
        }
    }

    /// Validate `request`, then build its subscriptions.
    ///
    /// Nothing is generated when validation fails.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        request: GenerationRequest,
        rng: &mut R,
    ) -> Result<SubscriptionPlan, GenerationError> {
        let count = request.validate(self.catalog)?;
        let percentages = merge_percentages(request.field_percentages);

        let mut buckets = self.fill_buckets(count, &percentages, rng)?;
        apply_equality_bias(&mut buckets, &request.equality_target, rng);

        for bucket in &buckets {
            debug!(
                field = %bucket.field,
                requested_percentage = ?bucket.requested_percentage,
                generated = bucket.constraints.len(),
                equality = bucket.equality,
                "field bucket ready"
            );
        }

        Ok(pack(count, buckets))
    }

    /// Requested fields first, in request order, then filler fields in
    /// catalog order.
    fn fill_buckets<R: Rng + ?Sized>(
        &self,
        count: usize,
        percentages: &[(String, f64)],
        rng: &mut R,
    ) -> Result<Vec<FieldBucket>, GenerationError> {
        let mut buckets = Vec::with_capacity(self.catalog.len());

        for (field, percentage) in percentages {
            if !(0.0..=100.0).contains(percentage) {
                warn!(
                    field = %field,
                    percentage = *percentage,
                    "percentage outside 0-100, quota is floored as-is"
                );
            }
            let needed = quota(*percentage, count);
            let constraints = (0..needed)
                .map(|_| self.factory.make_constraint(field, rng))
                .collect::<Result<Vec<_>, _>>()?;
            buckets.push(FieldBucket {
                field: field.clone(),
                requested_percentage: Some(*percentage),
                constraints,
                equality: 0,
            });
        }

        for field in self.catalog.fields() {
            if percentages.iter().any(|(name, _)| *name == field.name) {
                continue;
            }
            let needed = rng.random_range(0..=count);
            let constraints = (0..needed)
                .map(|_| self.factory.make_constraint(&field.name, rng))
                .collect::<Result<Vec<_>, _>>()?;
            buckets.push(FieldBucket {
                field: field.name.clone(),
                requested_percentage: None,
                constraints,
                equality: 0,
            });
        }

        Ok(buckets)
    }
}

/// Collapse repeated fields: the last percentage wins, the first position is
/// kept.
fn merge_percentages(entries: Vec<FieldPercentage>) -> Vec<(String, f64)> {
    let mut merged: Vec<(String, f64)> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.iter_mut().find(|(field, _)| *field == entry.field) {
            Some(existing) => existing.1 = entry.percentage,
            None => merged.push((entry.field, entry.percentage)),
        }
    }
    merged
}

/// Upper bound on any quota, as a multiple of the slot count.
const MAX_QUOTA_FACTOR: usize = 100;

/// `floor(percentage% of total)`, clamped to `0..=total * MAX_QUOTA_FACTOR`.
fn quota(percentage: f64, total: usize) -> usize {
    let raw = (percentage * total as f64 / 100.0).floor();
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    (raw as usize).min(total.saturating_mul(MAX_QUOTA_FACTOR))
}

/// Force the first `eq_needed` constraints of the target bucket to `=` and
/// redraw the rest from the non-equality operators.
fn apply_equality_bias<R: Rng + ?Sized>(
    buckets: &mut [FieldBucket],
    target: &FieldPercentage,
    rng: &mut R,
) {
    let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.field == target.field) else {
        return;
    };

    if !(0.0..=100.0).contains(&target.percentage) {
        warn!(
            field = %target.field,
            percentage = target.percentage,
            "equality percentage outside 0-100, quota is floored as-is"
        );
    }

    let eq_needed = quota(target.percentage, bucket.constraints.len());
    let constraints = std::mem::take(&mut bucket.constraints);
    bucket.constraints = constraints
        .into_iter()
        .enumerate()
        .map(|(idx, constraint)| {
            if idx < eq_needed {
                constraint.with_operator(Operator::Eq)
            } else {
                constraint.with_operator(pick_operator(&Operator::NON_EQUALITY, rng))
            }
        })
        .collect();
    bucket.equality = eq_needed.min(bucket.constraints.len());
}

/// Round-robin the flattened buckets over `count` slots, dropping any
/// constraint whose slot already holds its field.
fn pack(count: usize, buckets: Vec<FieldBucket>) -> SubscriptionPlan {
    let mut slots: Vec<Subscription> = (0..count).map(|_| Subscription::new()).collect();
    let mut summaries = Vec::with_capacity(buckets.len());
    let mut dropped_duplicates = 0;
    let mut position = 0;

    for bucket in buckets {
        let mut summary = BucketSummary {
            field: bucket.field,
            requested_percentage: bucket.requested_percentage,
            generated: bucket.constraints.len(),
            equality: bucket.equality,
            placed: 0,
        };

        if count > 0 {
            for constraint in bucket.constraints {
                if slots[position % count].try_push(constraint) {
                    summary.placed += 1;
                } else {
                    dropped_duplicates += 1;
                }
                position += 1;
            }
        }

        summaries.push(summary);
    }

    SubscriptionPlan {
        subscriptions: slots,
        buckets: summaries,
        dropped_duplicates,
    }
}
