use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use crate::models::Season;

/// A single calendar rule: matches dates whose month is listed and, when a
/// day range is set, whose day-of-month falls inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRule {
    pub months: Vec<u32>,
    pub days: Option<RangeInclusive<u32>>,
    pub season: Season,
}

impl SeasonRule {
    pub fn months(months: &[u32], season: Season) -> Self {
        Self {
            months: months.to_vec(),
            days: None,
            season,
        }
    }

    pub fn months_and_days(months: &[u32], days: RangeInclusive<u32>, season: Season) -> Self {
        Self {
            months: months.to_vec(),
            days: Some(days),
            season,
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        if !self.months.contains(&date.month()) {
            return false;
        }

        match &self.days {
            Some(days) => days.contains(&date.day()),
            None => true,
        }
    }
}

/// Ordered rule table. The first matching rule decides the season; dates
/// matching no rule are low season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonCalendar {
    rules: Vec<SeasonRule>,
}

impl SeasonCalendar {
    pub fn with_rules(rules: Vec<SeasonRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SeasonRule] {
        &self.rules
    }

    pub fn classify(&self, date: NaiveDate) -> Season {
        self.rules
            .iter()
            .find(|rule| rule.matches(date))
            .map(|rule| rule.season)
            .unwrap_or(Season::Low)
    }
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self::with_rules(vec![
            // Southern-hemisphere summer.
            SeasonRule::months(&[12, 1, 2], Season::High),
            // Holy week approximation. Easter moves every year; this window is
            // a fixed stand-in, not a computed feast date.
            SeasonRule::months_and_days(&[3, 4], 10..=20, Season::High),
        ])
    }
}

pub fn classify(date: NaiveDate) -> Season {
    SeasonCalendar::default().classify(date)
}
