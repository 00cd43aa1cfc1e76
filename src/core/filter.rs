// CampaignLens - core/filter.rs
//
// Composable row selection over normalised campaigns.
// All active criteria are AND-combined.
// Core layer: pure logic, no I/O.

use crate::core::model::Campaign;
use std::collections::HashSet;

/// Complete filter state. All fields are AND-combined when applied.
///
/// Category sets hold display labels, so the no-data sentinel can be
/// selected or excluded explicitly by its label.
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    /// Channels to include (empty = all).
    pub channels: HashSet<String>,

    /// Campaign types to include (empty = all).
    pub campaign_types: HashSet<String>,

    /// Campaign types to leave out, applied after `campaign_types`.
    pub excluded_types: HashSet<String>,

    /// Target audiences to include (empty = all).
    pub audiences: HashSet<String>,

    /// First start month included (1-12). None = no lower bound.
    pub month_start: Option<u32>,

    /// Last start month included (1-12). None = no upper bound.
    pub month_end: Option<u32>,

    /// Drop rows whose channel, type or audience is the no-data sentinel.
    pub exclude_no_data: bool,
}

impl CampaignFilter {
    /// Returns true if no criteria are active.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
            && self.campaign_types.is_empty()
            && self.excluded_types.is_empty()
            && self.audiences.is_empty()
            && self.month_start.is_none()
            && self.month_end.is_none()
            && !self.exclude_no_data
    }

    /// Filter that leaves out the given campaign types only. Pass the
    /// no-data label to drop rows without a type; other columns are not
    /// inspected.
    pub fn excluding_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_types: types.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Check if a single campaign matches all active criteria.
    pub fn matches(&self, campaign: &Campaign) -> bool {
        if !self.channels.is_empty() && !self.channels.contains(campaign.channel.label()) {
            return false;
        }

        let type_label = campaign.campaign_type.label();
        if !self.campaign_types.is_empty() && !self.campaign_types.contains(type_label) {
            return false;
        }
        if self.excluded_types.contains(type_label) {
            return false;
        }

        if !self.audiences.is_empty() && !self.audiences.contains(campaign.audience.label()) {
            return false;
        }

        if self.exclude_no_data
            && (campaign.channel.is_no_data()
                || campaign.campaign_type.is_no_data()
                || campaign.audience.is_no_data())
        {
            return false;
        }

        if self.month_start.is_some() || self.month_end.is_some() {
            let Some(month) = campaign.month else {
                return false;
            };
            if self.month_start.is_some_and(|start| month < start) {
                return false;
            }
            if self.month_end.is_some_and(|end| month > end) {
                return false;
            }
        }

        true
    }
}

/// Apply a filter, returning indices of matching rows.
pub fn apply_filter(rows: &[Campaign], filter: &CampaignFilter) -> Vec<usize> {
    if filter.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, campaign)| filter.matches(campaign))
        .map(|(idx, _)| idx)
        .collect()
}

/// Iterate the rows matching `filter`.
pub fn select<'a>(
    rows: &'a [Campaign],
    filter: &'a CampaignFilter,
) -> impl Iterator<Item = &'a Campaign> + 'a {
    rows.iter().filter(move |campaign| filter.matches(campaign))
}
