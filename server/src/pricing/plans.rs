//! Recurring ticket plans. The catalogue is a fixed table; prices are whole reais.

use rust_decimal::Decimal;
use serde::Serialize;

use super::TICKET_PRICE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub tickets: u32,
    pub months: u32,
    monthly_price: u32,
    total_price: u32,
    savings: u32,
}

const fn plan(tickets: u32, months: u32, monthly_price: u32, total_price: u32, savings: u32) -> Plan {
    Plan {
        tickets,
        months,
        monthly_price,
        total_price,
        savings,
    }
}

pub const DURATIONS: [u32; 3] = [3, 6, 12];

pub static PLANS: [Plan; 15] = [
    plan(10, 3, 300, 900, 0),
    plan(10, 6, 285, 1710, 90),
    plan(10, 12, 270, 3240, 240),
    plan(20, 3, 570, 1710, 90),
    plan(20, 6, 540, 3240, 240),
    plan(20, 12, 510, 6120, 480),
    plan(30, 3, 810, 2430, 270),
    plan(30, 6, 765, 4590, 540),
    plan(30, 12, 720, 8640, 960),
    plan(40, 3, 1080, 3240, 360),
    plan(40, 6, 1020, 6120, 720),
    plan(40, 12, 960, 11520, 1440),
    plan(50, 3, 1350, 4050, 450),
    plan(50, 6, 1275, 7650, 900),
    plan(50, 12, 1200, 14400, 1800),
];

impl Plan {
    pub fn monthly_price(&self) -> Decimal {
        Decimal::from(self.monthly_price)
    }

    pub fn total_price(&self) -> Decimal {
        Decimal::from(self.total_price)
    }

    pub fn savings(&self) -> Decimal {
        Decimal::from(self.savings)
    }

    /// Savings relative to buying every ticket of the plan at list price, in percent.
    pub fn savings_percentage(&self) -> Decimal {
        let list_price = TICKET_PRICE * Decimal::from(self.tickets * self.months);
        (self.savings() / list_price * Decimal::ONE_HUNDRED).round_dp(2)
    }

    fn same_as(&self, other: &Plan) -> bool {
        self.tickets == other.tickets && self.months == other.months
    }
}

pub fn find(tickets: u32, months: u32) -> Option<&'static Plan> {
    PLANS
        .iter()
        .find(|plan| plan.tickets == tickets && plan.months == months)
}

pub fn plans_by_duration(months: u32) -> impl Iterator<Item = &'static Plan> {
    PLANS.iter().filter(move |plan| plan.months == months)
}

pub fn most_popular() -> &'static Plan {
    &PLANS[4]
}

/// Plan with the highest savings ratio. The unit price is common to every row, so the
/// comparison is `savings / (tickets * months)`, done in integers. Ties go to the later row.
pub fn best_value() -> &'static Plan {
    let mut best = &PLANS[0];
    for current in PLANS.iter().skip(1) {
        let lhs = u64::from(current.savings) * u64::from(best.tickets * best.months);
        let rhs = u64::from(best.savings) * u64::from(current.tickets * current.months);
        if lhs >= rhs {
            best = current;
        }
    }
    best
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanCard {
    pub tickets: u32,
    pub months: u32,
    pub monthly_price: Decimal,
    pub total_price: Decimal,
    pub savings: Decimal,
    pub savings_percentage: Decimal,
    pub auto_renew: bool,
    pub most_popular: bool,
    pub best_value: bool,
}

impl From<&Plan> for PlanCard {
    fn from(plan: &Plan) -> Self {
        Self {
            tickets: plan.tickets,
            months: plan.months,
            monthly_price: plan.monthly_price(),
            total_price: plan.total_price(),
            savings: plan.savings(),
            savings_percentage: plan.savings_percentage(),
            auto_renew: true,
            most_popular: plan.same_as(most_popular()),
            best_value: plan.same_as(best_value()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanGroup {
    pub months: u32,
    pub plans: Vec<PlanCard>,
}

pub fn catalogue() -> Vec<PlanGroup> {
    DURATIONS
        .iter()
        .map(|&months| PlanGroup {
            months,
            plans: plans_by_duration(months).map(PlanCard::from).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_are_consistent() {
        for plan in PLANS.iter() {
            assert_eq!(plan.monthly_price * plan.months, plan.total_price);
        }
    }

    #[test]
    fn best_value_is_fifty_tickets_for_a_year() {
        let best = best_value();
        assert_eq!((best.tickets, best.months), (50, 12));

        let ratio = |p: &Plan| p.savings() / Decimal::from(p.tickets * p.months);
        for plan in PLANS.iter() {
            assert!(ratio(plan) <= ratio(best));
        }
    }

    #[test]
    fn most_popular_is_twenty_tickets_for_six_months() {
        let popular = most_popular();
        assert_eq!((popular.tickets, popular.months), (20, 6));
    }

    #[test]
    fn groups_by_duration_in_table_order() {
        let groups = catalogue();
        assert_eq!(groups.len(), 3);
        for group in &groups {
            assert_eq!(group.plans.len(), 5);
            assert!(group.plans.iter().all(|p| p.months == group.months));
            let tickets: Vec<u32> = group.plans.iter().map(|p| p.tickets).collect();
            assert_eq!(tickets, vec![10, 20, 30, 40, 50]);
        }
        let flagged_best: usize = groups
            .iter()
            .flat_map(|g| &g.plans)
            .filter(|p| p.best_value)
            .count();
        assert_eq!(flagged_best, 1);
    }

    #[test]
    fn savings_percentage_is_relative_to_list_price() {
        assert_eq!(find(10, 3).unwrap().savings_percentage(), Decimal::ZERO);
        // 1800 / (50 * 90 * 12) = 3.33%
        assert_eq!(find(50, 12).unwrap().savings_percentage(), Decimal::new(333, 2));
        assert!(find(15, 3).is_none());
    }
}
