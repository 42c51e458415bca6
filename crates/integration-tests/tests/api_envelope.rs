//! Tests for the response envelope contract.
//!
//! Every endpoint answers the `{status, message, data}` wrapper; these tests
//! pin the wire shape the storefront client parses, including the camelCase
//! field names and string-encoded prices.

use chrono::Utc;
use rust_decimal::Decimal;

use orchard_api::models::{Product, User};
use orchard_api::routes::users::AuthedUser;
use orchard_core::{Email, Envelope, PageContext, ProductId, UserId};

fn sample_product(id: i32, name: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        price: Decimal::new(1999, 2),
        image: "/images/airpods.jpg".to_owned(),
        brand: "Apple".to_owned(),
        category: "Electronics".to_owned(),
        count_in_stock: 7,
        description: "Wireless earbuds".to_owned(),
        rating: 4.5,
        num_reviews: 2,
        reviews: Vec::new(),
        created_by: UserId::new(1),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_product_collection_envelope() {
    let products = vec![sample_product(1, "Airpods"), sample_product(2, "iPhone")];
    let envelope = Envelope::success("Products Fetched Successfully", products)
        .with_page_context(PageContext::new(1, 2, 10, ""));

    let json = serde_json::to_value(&envelope).expect("serializes");
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Products Fetched Successfully");
    assert_eq!(json["data"][0]["id"], 1);
    assert_eq!(json["data"][0]["countInStock"], 7);
    assert_eq!(json["data"][0]["numReviews"], 2);
    // Decimal prices travel as strings so cents survive exactly.
    assert_eq!(json["data"][0]["price"], "19.99");
    assert_eq!(json["page_context"]["page"], 1);
    assert_eq!(json["page_context"]["total_pages"], 1);
}

#[test]
fn test_keyword_filter_is_echoed() {
    let envelope = Envelope::success("Products Fetched Successfully", Vec::<Product>::new())
        .with_page_context(PageContext::new(1, 0, 10, "phone"));

    let json = serde_json::to_value(&envelope).expect("serializes");
    // Zero matches is a success with an empty collection, never an error.
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"], serde_json::json!([]));
    assert_eq!(json["page_context"]["total_pages"], 0);
    assert_eq!(json["page_context"]["applied_filter"], "phone");
}

#[test]
fn test_failure_envelope_has_no_payload_fields() {
    let envelope = Envelope::failure("Order Not Found");
    let json = serde_json::to_value(&envelope).expect("serializes");

    assert_eq!(json["status"], "failure");
    assert_eq!(json["message"], "Order Not Found");
    assert!(json.get("data").is_none());
    assert!(json.get("page_context").is_none());
    assert!(json.get("errorSummary").is_none());
}

#[test]
fn test_internal_failure_summary_is_generic() {
    let envelope = Envelope::internal_failure("Internal server error", "unexpected internal error");
    let json = serde_json::to_value(&envelope).expect("serializes");

    assert_eq!(json["status"], "failure");
    assert_eq!(json["errorSummary"], "unexpected internal error");
}

#[test]
fn test_authed_user_shape() {
    let user = User {
        id: UserId::new(3),
        name: "Jane".to_owned(),
        email: Email::parse("jane@example.com").expect("valid email"),
        password_hash: "$argon2id$...".to_owned(),
        is_admin: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let authed = AuthedUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        token: "token-value".to_owned(),
    };

    let json = serde_json::to_value(&authed).expect("serializes");
    assert_eq!(json["id"], 3);
    assert_eq!(json["email"], "jane@example.com");
    assert_eq!(json["isAdmin"], false);
    assert_eq!(json["token"], "token-value");
    // The password hash has no serialized representation anywhere.
    assert!(json.get("password_hash").is_none());
    assert!(json.get("passwordHash").is_none());
}
