//! Keyword fallback used when no provider result is available.
//!
//! Rules are checked in order against the lower-cased description and the
//! first match wins.

pub const RECENT_ORDERING_USERS_SQL: &str = "SELECT DISTINCT u.* \nFROM users u \nJOIN orders o ON u.id = o.user_id \nWHERE o.created_at >= NOW() - INTERVAL '30 days';";

pub const ALL_USERS_SQL: &str = "SELECT * FROM users;";

pub const REVENUE_BY_USER_SQL: &str = "SELECT u.id, u.name, u.email, SUM(o.total_amount) AS total_revenue
FROM users u
LEFT JOIN orders o ON u.id = o.user_id
GROUP BY u.id, u.name, u.email
ORDER BY total_revenue DESC;";

pub const IN_STOCK_PRODUCTS_SQL: &str = "SELECT * FROM products WHERE stock > 0;";

pub const DEFAULT_SQL: &str = "SELECT * FROM users LIMIT 10;";

pub struct MockRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub sql: &'static str,
}

fn users_with_orders(d: &str) -> bool {
    d.contains("user") && d.contains("order")
}

fn all_users(d: &str) -> bool {
    d.contains("all users")
}

fn revenue(d: &str) -> bool {
    d.contains("revenue") || d.contains("total")
}

fn products(d: &str) -> bool {
    d.contains("product")
}

pub static MOCK_RULES: &[MockRule] = &[
    MockRule { name: "users_with_orders", matches: users_with_orders, sql: RECENT_ORDERING_USERS_SQL },
    MockRule { name: "all_users", matches: all_users, sql: ALL_USERS_SQL },
    MockRule { name: "revenue", matches: revenue, sql: REVENUE_BY_USER_SQL },
    MockRule { name: "products", matches: products, sql: IN_STOCK_PRODUCTS_SQL },
];

/// The rule that handles `description`, if any.
pub fn matching_rule(description: &str) -> Option<&'static MockRule> {
    let lowered = description.to_lowercase();
    MOCK_RULES.iter().find(|rule| (rule.matches)(&lowered))
}

pub fn generate_mock_sql(description: &str) -> &'static str {
    matching_rule(description).map_or(DEFAULT_SQL, |rule| rule.sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_branch_reachable() {
        assert_eq!(generate_mock_sql("users who placed an order"), RECENT_ORDERING_USERS_SQL);
        assert_eq!(generate_mock_sql("show me all users"), ALL_USERS_SQL);
        assert_eq!(generate_mock_sql("monthly revenue"), REVENUE_BY_USER_SQL);
        assert_eq!(generate_mock_sql("grand total"), REVENUE_BY_USER_SQL);
        assert_eq!(generate_mock_sql("list products"), IN_STOCK_PRODUCTS_SQL);
        assert_eq!(generate_mock_sql("something else entirely"), DEFAULT_SQL);
    }

    #[test]
    fn test_exact_templates() {
        assert_eq!(
            RECENT_ORDERING_USERS_SQL,
            "SELECT DISTINCT u.* \nFROM users u \nJOIN orders o ON u.id = o.user_id \nWHERE o.created_at >= NOW() - INTERVAL '30 days';"
        );
        assert_eq!(
            REVENUE_BY_USER_SQL,
            "SELECT u.id, u.name, u.email, SUM(o.total_amount) AS total_revenue\nFROM users u\nLEFT JOIN orders o ON u.id = o.user_id\nGROUP BY u.id, u.name, u.email\nORDER BY total_revenue DESC;"
        );
        assert_eq!(ALL_USERS_SQL, "SELECT * FROM users;");
        assert_eq!(IN_STOCK_PRODUCTS_SQL, "SELECT * FROM products WHERE stock > 0;");
        assert_eq!(DEFAULT_SQL, "SELECT * FROM users LIMIT 10;");
    }

    #[test]
    fn test_priority_shadows_later_rules() {
        // user + order beats revenue
        assert_eq!(generate_mock_sql("revenue from user orders"), RECENT_ORDERING_USERS_SQL);
        // all users + order still hits the first rule
        assert_eq!(generate_mock_sql("all users with orders"), RECENT_ORDERING_USERS_SQL);
        // all users beats total
        assert_eq!(generate_mock_sql("total of all users"), ALL_USERS_SQL);
        // revenue beats product
        assert_eq!(generate_mock_sql("product revenue"), REVENUE_BY_USER_SQL);
        assert_eq!(matching_rule("total revenue by user").map(|r| r.name), Some("revenue"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(generate_mock_sql("SHOW ME ALL USERS"), ALL_USERS_SQL);
        assert_eq!(generate_mock_sql("Products In Stock"), IN_STOCK_PRODUCTS_SQL);
    }

    #[test]
    fn test_deterministic_and_total() {
        for input in ["", "   ", "ünïcødé", "all users", "user order revenue product"] {
            assert_eq!(generate_mock_sql(input), generate_mock_sql(input));
        }
        assert_eq!(generate_mock_sql(""), DEFAULT_SQL);
        assert!(matching_rule("").is_none());
    }
}
