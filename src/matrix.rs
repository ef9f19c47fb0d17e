// src/matrix.rs
use chrono::NaiveDate;

/// One polling unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDate {
    pub date: String,
    pub origin: String,
    pub destination: String,
}

/// Dates × origins × destinations, fixed for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct PollingMatrix {
    pub dates: Vec<NaiveDate>,
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
}

impl PollingMatrix {
    pub fn len(&self) -> usize {
        self.dates.len() * self.origins.len() * self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dates outer, then origins, then destinations.
    pub fn triples(&self) -> impl Iterator<Item = RouteDate> + '_ {
        self.dates.iter().flat_map(move |date| {
            let date = date.format("%Y-%m-%d").to_string();
            self.origins.iter().flat_map(move |origin| {
                let date = date.clone();
                self.destinations.iter().map(move |destination| RouteDate {
                    date: date.clone(),
                    origin: origin.clone(),
                    destination: destination.clone(),
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_dates_then_origins_then_destinations() {
        let m = PollingMatrix {
            dates: vec![
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            ],
            origins: vec!["MOW".into(), "LED".into()],
            destinations: vec!["AER".into()],
        };
        let order: Vec<String> = m
            .triples()
            .map(|t| format!("{} {}-{}", t.date, t.origin, t.destination))
            .collect();
        assert_eq!(
            order,
            vec![
                "2025-06-01 MOW-AER",
                "2025-06-01 LED-AER",
                "2025-06-02 MOW-AER",
                "2025-06-02 LED-AER",
            ]
        );
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn empty_axis_means_no_work() {
        let m = PollingMatrix {
            dates: vec![NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()],
            origins: vec!["MOW".into()],
            destinations: vec![],
        };
        assert!(m.is_empty());
        assert_eq!(m.triples().count(), 0);
    }
}
