use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::property::Property;
use super::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriceStats {
    pub min: i64,
    pub max: i64,
    pub average: f64,
}

/// Dashboard aggregates over a (possibly filtered) listing set.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_properties: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    /// Absent when there are no listings.
    pub price: Option<PriceStats>,
    pub users_by_role: BTreeMap<String, usize>,
}

impl DashboardSummary {
    pub fn build(properties: &[&Property], users: &[User]) -> Self {
        let mut by_status = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        for property in properties {
            *by_status.entry(property.status.to_string()).or_insert(0) += 1;
            *by_type.entry(property.property_type.to_string()).or_insert(0) += 1;
        }

        let price = price_stats(properties.iter().map(|p| p.price));

        let mut users_by_role = BTreeMap::new();
        for user in users {
            *users_by_role.entry(user.role.to_string()).or_insert(0) += 1;
        }

        Self {
            total_properties: properties.len(),
            by_status,
            by_type,
            price,
            users_by_role,
        }
    }
}

fn price_stats(prices: impl Iterator<Item = i64>) -> Option<PriceStats> {
    let (mut min, mut max, mut sum, mut count) = (i64::MAX, i64::MIN, 0i128, 0usize);
    for price in prices {
        min = min.min(price);
        max = max.max(price);
        sum += price as i128;
        count += 1;
    }
    (count > 0).then(|| PriceStats {
        min,
        max,
        average: sum as f64 / count as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::property::demo_catalog;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_summary_over_demo_catalog() {
        let now = Utc::now();
        let catalog: Vec<Property> = demo_catalog()
            .into_iter()
            .map(|req| req.into_property(Uuid::new_v4(), now))
            .collect();
        let refs: Vec<&Property> = catalog.iter().collect();

        let summary = DashboardSummary::build(&refs, &[]);
        assert_eq!(summary.total_properties, 3);
        assert_eq!(summary.by_status.get("available"), Some(&2));
        assert_eq!(summary.by_status.get("reserved"), Some(&1));
        assert_eq!(summary.by_type.get("villa"), Some(&1));
        let price = summary.price.expect("price stats");
        assert_eq!((price.min, price.max), (180_000, 500_000));
        assert!((price.average - 310_000.0).abs() < f64::EPSILON);
        assert!(summary.users_by_role.is_empty());
    }

    #[test]
    fn test_summary_of_nothing_has_no_price() {
        let summary = DashboardSummary::build(&[], &[]);
        assert_eq!(summary.total_properties, 0);
        assert_eq!(summary.price, None);
    }
}
