//! Gap analysis - which requested parts are still missing
//!
//! Pure and stateless: the same request and owned parts always produce the
//! same [`GapReport`]. Names are compared exactly (case-sensitive).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::model::Slot;

/// One `(slot, part name)` pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartRef {
    pub slot: Slot,
    pub name: String,
}

impl PartRef {
    pub fn new(slot: Slot, name: impl Into<String>) -> Self {
        Self {
            slot,
            name: name.into(),
        }
    }
}

impl fmt::Display for PartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slot, self.name)
    }
}

/// A set of part names per slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSets {
    pub primary: BTreeSet<String>,
    pub secondary: BTreeSet<String>,
    pub tertiary: BTreeSet<String>,
}

impl SlotSets {
    pub fn get(&self, slot: Slot) -> &BTreeSet<String> {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
            Slot::Tertiary => &self.tertiary,
        }
    }

    fn get_mut(&mut self, slot: Slot) -> &mut BTreeSet<String> {
        match slot {
            Slot::Primary => &mut self.primary,
            Slot::Secondary => &mut self.secondary,
            Slot::Tertiary => &mut self.tertiary,
        }
    }

    /// Returns `true` when the name was not present yet
    pub fn insert(&mut self, slot: Slot, name: &str) -> bool {
        self.get_mut(slot).insert(name.to_string())
    }

    pub fn contains(&self, slot: Slot, name: &str) -> bool {
        self.get(slot).contains(name)
    }

    /// Total names across all slots
    pub fn len(&self) -> usize {
        Slot::ALL.iter().map(|slot| self.get(*slot).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        Slot::ALL.iter().all(|slot| self.get(*slot).is_empty())
    }

    /// All pairs in slot order, then name order
    pub fn pairs(&self) -> impl Iterator<Item = PartRef> + '_ {
        Slot::ALL.into_iter().flat_map(move |slot| {
            self.get(slot)
                .iter()
                .map(move |name| PartRef::new(slot, name.clone()))
        })
    }

    /// Per-slot set difference `self − other`
    pub fn difference(&self, other: &SlotSets) -> SlotSets {
        let mut out = SlotSets::default();
        for slot in Slot::ALL {
            *out.get_mut(slot) = self.get(slot).difference(other.get(slot)).cloned().collect();
        }
        out
    }
}

impl FromIterator<PartRef> for SlotSets {
    fn from_iter<I: IntoIterator<Item = PartRef>>(iter: I) -> Self {
        let mut sets = SlotSets::default();
        for part in iter {
            sets.get_mut(part.slot).insert(part.name);
        }
        sets
    }
}

/// One desired build; blank slots are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartTriad {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl PartTriad {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        }
    }

    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
            Slot::Tertiary => &self.tertiary,
        }
    }
}

/// Parses `primary/secondary/tertiary`; trailing segments may be omitted
/// and any segment may be blank (`Dran Sword//Flat`)
impl FromStr for PartTriad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('/').map(str::trim).collect();
        if segments.len() > 3 {
            return Err(format!(
                "Invalid build '{s}'. Expected at most three '/'-separated parts"
            ));
        }

        let segment = |i: usize| segments.get(i).copied().unwrap_or_default();
        let triad = PartTriad::new(segment(0), segment(1), segment(2));

        if Slot::ALL.iter().all(|slot| triad.get(*slot).is_empty()) {
            return Err(format!("Invalid build '{s}'. At least one part is required"));
        }
        Ok(triad)
    }
}

/// Ordered list of builds the user wants to assemble
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssemblyRequest {
    pub builds: Vec<PartTriad>,
}

impl AssemblyRequest {
    pub fn new(builds: Vec<PartTriad>) -> Self {
        Self { builds }
    }

    /// Union of requested part names per slot, trimmed, blanks excluded
    pub fn needed(&self) -> SlotSets {
        let mut needed = SlotSets::default();
        for build in &self.builds {
            for slot in Slot::ALL {
                let name = build.get(slot).trim();
                if !name.is_empty() {
                    needed.insert(slot, name);
                }
            }
        }
        needed
    }
}

impl From<Vec<PartTriad>> for AssemblyRequest {
    fn from(builds: Vec<PartTriad>) -> Self {
        Self::new(builds)
    }
}

/// Needed, owned and missing parts for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub needed: SlotSets,
    pub owned: SlotSets,
    pub missing: SlotSets,
    pub needed_count: usize,
    /// Needed parts that are owned
    pub owned_count: usize,
    pub missing_count: usize,
    /// `round(100 * (needed - missing) / needed)`; 100 when nothing is needed
    pub completion_percentage: u8,
    pub is_complete: bool,
}

/// Compute the gap between a request and the owned parts
pub fn analyze_gap(request: &AssemblyRequest, owned: &SlotSets) -> GapReport {
    let needed = request.needed();
    let missing = needed.difference(owned);

    let needed_count = needed.len();
    let missing_count = missing.len();
    let owned_count = needed_count - missing_count;

    let completion_percentage = if needed_count == 0 {
        100
    } else {
        (100.0 * owned_count as f64 / needed_count as f64).round() as u8
    };

    GapReport {
        is_complete: missing.is_empty(),
        needed,
        owned: owned.clone(),
        missing,
        needed_count,
        owned_count,
        missing_count,
        completion_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owned(pairs: &[(Slot, &str)]) -> SlotSets {
        pairs
            .iter()
            .map(|(slot, name)| PartRef::new(*slot, *name))
            .collect()
    }

    #[test]
    fn test_blank_slots_are_ignored() {
        let request = AssemblyRequest::new(vec![
            PartTriad::new("Dran Sword", "", "Flat"),
            PartTriad::new("", "  ", ""),
        ]);

        let report = analyze_gap(&request, &SlotSets::default());
        assert!(report.needed.secondary.is_empty());
        assert_eq!(report.needed_count, 2);
        assert_eq!(report.missing_count, 2);
        assert_eq!(report.completion_percentage, 0);
    }

    #[test]
    fn test_needed_is_union_across_builds() {
        let request = AssemblyRequest::new(vec![
            PartTriad::new("Dran Sword", "3-60", "Flat"),
            PartTriad::new("Dran Sword", "4-60", "Flat"),
        ]);

        let needed = request.needed();
        assert_eq!(needed.primary.len(), 1);
        assert_eq!(needed.secondary.len(), 2);
        assert_eq!(needed.len(), 4);
    }

    #[test]
    fn test_missing_is_exact_case_sensitive_difference() {
        let request = AssemblyRequest::new(vec![PartTriad::new("Dran Sword", "3-60", "Flat")]);
        let owned = owned(&[(Slot::Primary, "dran sword"), (Slot::Secondary, "3-60")]);

        let report = analyze_gap(&request, &owned);
        assert!(report.missing.contains(Slot::Primary, "Dran Sword"));
        assert!(!report.missing.contains(Slot::Secondary, "3-60"));
        assert_eq!(report.missing_count, 2);
        assert_eq!(report.owned_count, 1);
        assert_eq!(report.completion_percentage, 33);
        assert!(!report.is_complete);
    }

    #[test]
    fn test_owned_in_wrong_slot_does_not_count() {
        let request = AssemblyRequest::new(vec![PartTriad::new("Flat", "", "")]);
        let owned = owned(&[(Slot::Tertiary, "Flat")]);

        let report = analyze_gap(&request, &owned);
        assert!(report.missing.contains(Slot::Primary, "Flat"));
    }

    #[test]
    fn test_padded_request_names_match_owned_parts() {
        let request = AssemblyRequest::new(vec![PartTriad::new("Dran Sword ", "3-60", " Flat")]);
        let owned = owned(&[(Slot::Primary, "Dran Sword"), (Slot::Tertiary, "Flat")]);

        let report = analyze_gap(&request, &owned);
        assert!(report.needed.contains(Slot::Tertiary, "Flat"));
        assert!(!report.needed.contains(Slot::Tertiary, " Flat"));
        assert_eq!(report.owned_count, 2);
        assert_eq!(report.missing_count, 1);
        assert!(report.missing.contains(Slot::Secondary, "3-60"));
    }

    #[test]
    fn test_fully_owned_request_is_complete() {
        let request = AssemblyRequest::new(vec![PartTriad::new("Dran Sword", "3-60", "Flat")]);
        let owned = owned(&[
            (Slot::Primary, "Dran Sword"),
            (Slot::Secondary, "3-60"),
            (Slot::Tertiary, "Flat"),
            (Slot::Tertiary, "Ball"),
        ]);

        let report = analyze_gap(&request, &owned);
        assert!(report.is_complete);
        assert_eq!(report.completion_percentage, 100);
        assert_eq!(report.missing, SlotSets::default());
    }

    #[test]
    fn test_empty_request_is_complete() {
        let report = analyze_gap(&AssemblyRequest::default(), &SlotSets::default());
        assert!(report.is_complete);
        assert_eq!(report.completion_percentage, 100);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let request = AssemblyRequest::new(vec![
            PartTriad::new("Dran Sword", "3-60", "Flat"),
            PartTriad::new("Wizard Arrow", "", "Ball"),
        ]);
        let owned = owned(&[(Slot::Tertiary, "Flat")]);

        assert_eq!(analyze_gap(&request, &owned), analyze_gap(&request, &owned));
    }

    #[test]
    fn test_completion_rounds_half_up() {
        // 1 of 8 owned -> 12.5% -> 13
        let request = AssemblyRequest::new(vec![
            PartTriad::new("A", "B", "C"),
            PartTriad::new("D", "E", "F"),
            PartTriad::new("G", "H", ""),
        ]);
        let owned = owned(&[(Slot::Primary, "A")]);

        let report = analyze_gap(&request, &owned);
        assert_eq!(report.needed_count, 8);
        assert_eq!(report.completion_percentage, 13);
    }

    #[test]
    fn test_parse_triad() {
        let triad: PartTriad = "Dran Sword/3-60/Flat".parse().unwrap();
        assert_eq!(triad, PartTriad::new("Dran Sword", "3-60", "Flat"));

        let partial: PartTriad = "Dran Sword//Flat".parse().unwrap();
        assert_eq!(partial.secondary, "");

        let short: PartTriad = "Dran Sword".parse().unwrap();
        assert_eq!(short.tertiary, "");

        assert!("a/b/c/d".parse::<PartTriad>().is_err());
        assert!("//".parse::<PartTriad>().is_err());
    }
}
