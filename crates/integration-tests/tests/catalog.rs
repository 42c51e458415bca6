//! Tests for rating aggregation, pagination math and account type rules.

use orchard_api::db::products::PAGE_SIZE;
use orchard_api::models::product::mean_rating;
use orchard_core::{Email, PageContext};

// =============================================================================
// Rating Aggregation
// =============================================================================

#[test]
fn test_mean_rating_of_no_reviews_is_zero() {
    assert!((mean_rating(&[]) - 0.0).abs() < f64::EPSILON);
}

#[test]
fn test_mean_rating_is_arithmetic_mean() {
    assert!((mean_rating(&[4]) - 4.0).abs() < f64::EPSILON);
    assert!((mean_rating(&[1, 5]) - 3.0).abs() < f64::EPSILON);
    // 4.333... keeps its fraction; it is never rounded to a whole star.
    assert!((mean_rating(&[4, 4, 5]) - 13.0 / 3.0).abs() < 1e-9);
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_page_size_is_ten() {
    // The client's pager is built around this figure.
    assert_eq!(PAGE_SIZE, 10);
}

#[test]
fn test_total_pages_rounds_up() {
    assert_eq!(PageContext::new(1, 1, PAGE_SIZE, "").total_pages, 1);
    assert_eq!(PageContext::new(1, 10, PAGE_SIZE, "").total_pages, 1);
    assert_eq!(PageContext::new(1, 11, PAGE_SIZE, "").total_pages, 2);
    assert_eq!(PageContext::new(1, 0, PAGE_SIZE, "").total_pages, 0);
}

// =============================================================================
// Email Normalization
// =============================================================================

#[test]
fn test_email_is_lowercased_on_parse() {
    let email = Email::parse("John@Example.COM").expect("valid email");
    assert_eq!(email.as_str(), "john@example.com");
}

#[test]
fn test_invalid_emails_are_rejected() {
    assert!(Email::parse("").is_err());
    assert!(Email::parse("no-at-sign").is_err());
    assert!(Email::parse("@domain.com").is_err());
    assert!(Email::parse("user@").is_err());
}
