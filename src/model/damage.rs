//! Damage aggregation.
//!
//! [`DamageSummary`] keeps six [`DamageStat`] buckets, {melee, ranged, afk} x
//! {dealt, received}. Totals and average ranges are derived on read and never
//! stored.

use crate::model::{DamageCategory, DamageInstance, DamageSide};

// ===== DamageStat =====

/// Running statistics for one (category, side) bucket.
///
/// # Invariants
///
/// - `count` only counts unblocked hits, while `range_sum` includes blocked
///   hits too. `average_range()` divides one by the other, so blocked hits
///   pull the average up. This matches the numbers players compare against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageStat {
    /// Damage from unblocked hits.
    pub amount: f64,
    /// Unblocked hits.
    pub count: u64,
    /// Range of every hit, blocked or not.
    pub range_sum: f64,
    /// Backstabs.
    pub backstab_count: u64,
    /// Headshots.
    pub headshot_count: u64,
    /// Blocked melee hits.
    pub melee_block_count: u64,
    /// Blocked ranged hits.
    pub range_block_count: u64,
    /// Estimated damage absorbed by ranged blocks.
    pub range_block_amount: f64,
}

impl DamageStat {
    /// Fold one hit into this bucket.
    pub fn add(&mut self, instance: &DamageInstance) {
        if !instance.is_blocked() {
            self.count += 1;
            self.amount += instance.amount();
        }

        self.range_sum += instance.range();

        if instance.is_backstab() {
            self.backstab_count += 1;
        }
        if instance.is_headshot() {
            self.headshot_count += 1;
        }

        if instance.is_blocked() {
            if instance.is_ranged() {
                self.range_block_count += 1;
                self.range_block_amount += instance.amount() * (f64::from(instance.block()) / 100.0);
            } else {
                self.melee_block_count += 1;
            }
        }
    }

    /// Elementwise sum of two buckets.
    pub fn merge(&mut self, other: &DamageStat) {
        self.amount += other.amount;
        self.count += other.count;
        self.range_sum += other.range_sum;
        self.backstab_count += other.backstab_count;
        self.headshot_count += other.headshot_count;
        self.melee_block_count += other.melee_block_count;
        self.range_block_count += other.range_block_count;
        self.range_block_amount += other.range_block_amount;
    }

    /// `range_sum / count`, or 0 when nothing was counted.
    pub fn average_range(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.range_sum / self.count as f64
        }
    }

    fn sum<'a>(stats: impl IntoIterator<Item = &'a DamageStat>) -> DamageStat {
        let mut total = DamageStat::default();
        for stat in stats {
            total.merge(stat);
        }
        total
    }
}

// ===== DamageSummary =====

/// Dealt and received buckets for one category.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DealtReceived {
    /// Hits the local player landed.
    pub dealt: DamageStat,
    /// Hits the local player took.
    pub received: DamageStat,
}

impl DealtReceived {
    /// Bucket for one side.
    pub fn side(&self, side: DamageSide) -> &DamageStat {
        match side {
            DamageSide::Dealt => &self.dealt,
            DamageSide::Received => &self.received,
        }
    }

    fn side_mut(&mut self, side: DamageSide) -> &mut DamageStat {
        match side {
            DamageSide::Dealt => &mut self.dealt,
            DamageSide::Received => &mut self.received,
        }
    }

    fn merge(&mut self, other: &DealtReceived) {
        self.dealt.merge(&other.dealt);
        self.received.merge(&other.received);
    }
}

/// Categorised damage statistics.
///
/// Used for the session total, each round, each opponent within a round, and
/// each opponent across the session. Summaries merge associatively and
/// commutatively, so partial results can be combined in any order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DamageSummary {
    /// Hits within the ranged threshold.
    pub melee: DealtReceived,
    /// Ranged hits that are not AFK.
    pub ranged: DealtReceived,
    /// Hits beyond the AFK threshold.
    pub afk: DealtReceived,
}

impl DamageSummary {
    /// Empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one hit into the bucket its classification selects.
    pub fn add(&mut self, instance: &DamageInstance) {
        self.category_mut(instance.category())
            .side_mut(instance.side())
            .add(instance);
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &DamageSummary) {
        self.melee.merge(&other.melee);
        self.ranged.merge(&other.ranged);
        self.afk.merge(&other.afk);
    }

    /// Merged copy of two summaries.
    pub fn merged(&self, other: &DamageSummary) -> DamageSummary {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Buckets for one category.
    pub fn category(&self, category: DamageCategory) -> &DealtReceived {
        match category {
            DamageCategory::Melee => &self.melee,
            DamageCategory::Ranged => &self.ranged,
            DamageCategory::Afk => &self.afk,
        }
    }

    fn category_mut(&mut self, category: DamageCategory) -> &mut DealtReceived {
        match category {
            DamageCategory::Melee => &mut self.melee,
            DamageCategory::Ranged => &mut self.ranged,
            DamageCategory::Afk => &mut self.afk,
        }
    }

    /// All dealt damage across categories.
    pub fn dealt(&self) -> DamageStat {
        DamageStat::sum([&self.melee.dealt, &self.ranged.dealt, &self.afk.dealt])
    }

    /// All received damage across categories.
    pub fn received(&self) -> DamageStat {
        DamageStat::sum([
            &self.melee.received,
            &self.ranged.received,
            &self.afk.received,
        ])
    }

    /// Combined range sum over combined count across all six buckets.
    pub fn average_range(&self) -> f64 {
        let mut all = self.dealt();
        all.merge(&self.received());
        all.average_range()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        *self == DamageSummary::default()
    }
}
