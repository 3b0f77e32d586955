use serde::Deserialize;

/// One slice of the severity-distribution section: a PHQ-8 band name and the
/// percentage of submissions falling in it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusSlice {
    pub name: String,
    pub value: f64,
}

/// One bucket of the age-distribution section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgeBucket {
    #[serde(rename = "ageGroup")]
    pub age_group: String,
    pub count: u64,
}

/// Aggregate statistics returned by `GET /api/stats`.
///
/// Every field is optional: the dashboard substitutes a per-section
/// placeholder for anything the backend leaves out, so an empty object `{}`
/// still renders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub total_tests: Option<u64>,
    pub total_audio: Option<u64>,
    pub average_phq8: Option<f64>,
    pub male_percent: Option<f64>,
    pub female_percent: Option<f64>,
    pub percentage_minimal: Option<f64>,
    pub percentage_moderate: Option<f64>,
    pub percentage_severe: Option<f64>,
    pub percentage_depressed: Option<f64>,
    pub percentage_not_depressed: Option<f64>,
    pub percentage_neutral: Option<f64>,
    pub status_distribution: Option<Vec<StatusSlice>>,
    pub age_distribution: Option<Vec<AgeBucket>>,
}

/// PHQ-8 severity bands, captioning the status-distribution section.
pub const SEVERITY_BANDS: [(&str, u8, u8); 5] = [
    ("Minimal", 0, 4),
    ("Mild", 5, 9),
    ("Moderate", 10, 14),
    ("Moderately severe", 15, 19),
    ("Severe", 20, 24),
];

/// Label for a total PHQ-8 score.
pub fn severity_label(score: u8) -> &'static str {
    for &(label, lo, hi) in &SEVERITY_BANDS {
        if score >= lo && score <= hi {
            return label;
        }
    }
    "Severe"
}

impl StatsSnapshot {
    pub fn total_tests(&self) -> u64 {
        self.total_tests.unwrap_or(0)
    }

    pub fn total_audio(&self) -> u64 {
        self.total_audio.unwrap_or(0)
    }

    pub fn average_phq8(&self) -> f64 {
        self.average_phq8.unwrap_or(0.0)
    }

    /// "male% / female%" headline, zeros when absent.
    pub fn gender_split(&self) -> (f64, f64) {
        (
            self.male_percent.unwrap_or(0.0),
            self.female_percent.unwrap_or(0.0),
        )
    }

    /// Screening outcomes (depressed / not depressed / neutral), or the
    /// illustrative dataset when every field is absent.
    pub fn outcome_split(&self) -> Vec<StatusSlice> {
        let reported = [
            ("Depressed", self.percentage_depressed),
            ("Not depressed", self.percentage_not_depressed),
            ("Neutral", self.percentage_neutral),
        ];
        if reported.iter().any(|(_, v)| v.is_some()) {
            return reported
                .into_iter()
                .map(|(name, value)| StatusSlice {
                    name: name.into(),
                    value: value.unwrap_or(0.0),
                })
                .collect();
        }
        placeholder_outcome_split()
    }

    /// Severity distribution, or the illustrative dataset when the backend
    /// did not provide one. Some backends report flat per-band percentages
    /// instead of a distribution list; those are accepted as a second source.
    pub fn status_distribution(&self) -> Vec<StatusSlice> {
        if let Some(slices) = &self.status_distribution {
            if !slices.is_empty() {
                return slices.clone();
            }
        }
        let flat = [
            ("Minimal (0-4)", self.percentage_minimal),
            ("Moderate (10-14)", self.percentage_moderate),
            ("Severe (20-24)", self.percentage_severe),
        ];
        if flat.iter().any(|(_, v)| v.is_some()) {
            return flat
                .into_iter()
                .map(|(name, value)| StatusSlice {
                    name: name.into(),
                    value: value.unwrap_or(0.0),
                })
                .collect();
        }
        placeholder_status_distribution()
    }

    /// Age distribution, or the illustrative dataset when absent.
    pub fn age_distribution(&self) -> Vec<AgeBucket> {
        match &self.age_distribution {
            Some(buckets) if !buckets.is_empty() => buckets.clone(),
            _ => placeholder_age_distribution(),
        }
    }
}

fn placeholder_status_distribution() -> Vec<StatusSlice> {
    [
        ("Minimal (0-4)", 35.3),
        ("Mild (5-9)", 23.7),
        ("Moderate (10-14)", 18.6),
        ("Moderately severe (15-19)", 14.1),
        ("Severe (20-24)", 8.3),
    ]
    .into_iter()
    .map(|(name, value)| StatusSlice {
        name: name.into(),
        value,
    })
    .collect()
}

fn placeholder_outcome_split() -> Vec<StatusSlice> {
    [
        ("Depressed", 28.4),
        ("Not depressed", 61.2),
        ("Neutral", 10.4),
    ]
    .into_iter()
    .map(|(name, value)| StatusSlice {
        name: name.into(),
        value,
    })
    .collect()
}

fn placeholder_age_distribution() -> Vec<AgeBucket> {
    [
        ("18-24", 45),
        ("25-34", 52),
        ("35-44", 38),
        ("45-54", 15),
        ("55+", 6),
    ]
    .into_iter()
    .map(|(age_group, count)| AgeBucket {
        age_group: age_group.into(),
        count,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_deserializes() {
        let snapshot: StatsSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.total_tests(), 0);
        assert_eq!(snapshot.average_phq8(), 0.0);
        assert!(snapshot.status_distribution.is_none());
    }

    #[test]
    fn empty_snapshot_falls_back_per_section() {
        let snapshot = StatsSnapshot::default();
        let status = snapshot.status_distribution();
        let ages = snapshot.age_distribution();
        assert_eq!(status.len(), 5);
        assert_eq!(status[0].name, "Minimal (0-4)");
        assert_eq!(ages.len(), 5);
        assert_eq!(ages[1].count, 52);
    }

    #[test]
    fn present_sections_are_passed_through() {
        let json = r#"{
            "totalTests": 42,
            "averagePhq8": 7.5,
            "malePercent": 60.0,
            "femalePercent": 40.0,
            "ageDistribution": [{"ageGroup": "18-24", "count": 42}]
        }"#;
        let snapshot: StatsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.total_tests(), 42);
        assert_eq!(snapshot.gender_split(), (60.0, 40.0));
        let ages = snapshot.age_distribution();
        assert_eq!(ages.len(), 1);
        assert_eq!(ages[0].count, 42);
        // Missing section still falls back independently.
        assert_eq!(snapshot.status_distribution().len(), 5);
    }

    #[test]
    fn flat_band_percentages_feed_the_distribution() {
        let json = r#"{
            "percentageMinimal": 40.0,
            "percentageSevere": 12.5
        }"#;
        let snapshot: StatsSnapshot = serde_json::from_str(json).unwrap();
        let status = snapshot.status_distribution();
        assert_eq!(status.len(), 3);
        assert_eq!(status[0].value, 40.0);
        // Unreported bands in the flat form read as zero, not placeholder.
        assert_eq!(status[1].value, 0.0);
        assert_eq!(status[2].value, 12.5);
    }

    #[test]
    fn outcome_split_falls_back_when_absent() {
        let snapshot = StatsSnapshot::default();
        let outcomes = snapshot.outcome_split();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].name, "Not depressed");

        let snapshot: StatsSnapshot =
            serde_json::from_str(r#"{"percentageDepressed": 31.0}"#).unwrap();
        let outcomes = snapshot.outcome_split();
        assert_eq!(outcomes[0].value, 31.0);
        assert_eq!(outcomes[2].value, 0.0);
    }

    #[test]
    fn severity_bands_cover_the_scale() {
        assert_eq!(severity_label(0), "Minimal");
        assert_eq!(severity_label(4), "Minimal");
        assert_eq!(severity_label(5), "Mild");
        assert_eq!(severity_label(14), "Moderate");
        assert_eq!(severity_label(19), "Moderately severe");
        assert_eq!(severity_label(24), "Severe");
    }
}
