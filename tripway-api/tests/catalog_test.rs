mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

async fn seed_hotels(app: &axum::Router) {
    let hotels = [
        ("Sea Breeze Inn", "Goa", "$", 40.0, 3.9),
        ("Palm Grove Resort", "Goa", "$$", 95.0, 4.4),
        ("Lagoon Palace", "Kochi", "$$$", 210.0, 4.8),
        ("Harbour Suites", "Kochi", "$$$$", 420.0, 4.1),
    ];
    for (name, location, price_range, per_night, rating) in hotels {
        let (status, body) = post(
            app,
            "/api/hotels",
            json!({
                "name": name,
                "location": location,
                "price_range": price_range,
                "price_per_night": per_night,
                "rating": rating,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }
}

#[tokio::test]
async fn test_hotel_search_price_range_is_a_prefix() {
    let (app, _) = test_app();
    seed_hotels(&app).await;

    let (status, body) = get(&app, "/api/hotels/search?priceRange=%24%24").await;
    assert_eq!(status, StatusCode::OK);
    let ranges: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["price_range"].as_str().unwrap())
        .collect();
    assert_eq!(ranges, vec!["$$$", "$$", "$$$$"]);
    assert!(ranges.iter().all(|r| r.starts_with("$$")));
}

#[tokio::test]
async fn test_hotel_search_filters_combine() {
    let (app, _) = test_app();
    seed_hotels(&app).await;

    let (_, body) = get(&app, "/api/hotels/search?location=goa&minRating=4").await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Palm Grove Resort"]);

    let (_, everything) = get(&app, "/api/hotels/search").await;
    let ratings: Vec<f64> = everything
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["rating"].as_f64().unwrap())
        .collect();
    assert_eq!(ratings, vec![4.8, 4.4, 4.1, 3.9]);
}

#[tokio::test]
async fn test_hotel_crud_and_validation() {
    let (app, _) = test_app();
    seed_hotels(&app).await;

    let (_, list) = get(&app, "/api/hotels").await;
    let first_id = list[0]["id"].as_u64().unwrap();
    let (status, hotel) = get(&app, &format!("/api/hotels/{}", first_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hotel["id"].as_u64(), Some(first_id));

    let (status, _) = get(&app, "/api/hotels/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &app,
        "/api/hotels",
        json!({ "name": "Odd", "location": "Goa", "price_range": "cheap", "price_per_night": 10.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_destination_search_and_crud() {
    let (app, _) = test_app();
    for (name, country, category, rating) in [
        ("Munnar", "India", "Hills", 4.7),
        ("Goa", "India", "Beach", 4.5),
        ("Bali", "Indonesia", "Beach", 4.8),
    ] {
        let (status, _) = post(
            &app,
            "/api/destinations",
            json!({ "name": name, "country": country, "category": category, "rating": rating }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, beaches) = get(&app, "/api/destinations/search?category=Beach").await;
    let names: Vec<&str> = beaches
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bali", "Goa"]);

    let (_, india) = get(&app, "/api/destinations/search?country=India&query=mun").await;
    assert_eq!(india.as_array().unwrap().len(), 1);
    assert_eq!(india[0]["name"], "Munnar");
    let id = india[0]["id"].as_u64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/destinations/{}", id),
        Some(json!({ "name": "Munnar", "country": "India", "category": "Tea estates", "rating": 4.9 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["category"], "Tea estates");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/destinations/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &format!("/api/destinations/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/destinations/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_package_children_and_details() {
    let (app, _) = test_app();
    let package_id = create_package(&app).await;

    let (status, inclusions) = get(&app, &format!("/api/packages/{}/inclusions", package_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inclusions.as_array().unwrap().len(), 2);

    let (_, itinerary) = get(&app, &format!("/api/packages/{}/itinerary", package_id)).await;
    let days: Vec<u64> = itinerary
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["day_number"].as_u64().unwrap())
        .collect();
    assert_eq!(days, vec![1, 2]);

    let (_, images) = get(&app, &format!("/api/packages/{}/images", package_id)).await;
    assert_eq!(images, json!([]));

    let (status, details) = get(&app, &format!("/api/packages/{}/details", package_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["package"]["title"], "Kerala Backwaters");
    assert_eq!(details["exclusions"].as_array().unwrap().len(), 1);
    assert_eq!(details["faqs"].as_array().unwrap().len(), 1);
    assert_eq!(details["accommodations"], json!([]));

    let (status, _) = get(&app, "/api/packages/999999/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_package_listing_by_destination() {
    let (app, _) = test_app();
    let (_, destination) = post(
        &app,
        "/api/destinations",
        json!({ "name": "Alleppey", "country": "India", "rating": 4.4 }),
    )
    .await;
    let destination_id = destination["id"].as_u64().unwrap();

    create_package(&app).await;
    let (status, _) = post(
        &app,
        "/api/packages",
        json!({
            "destination_id": destination_id,
            "title": "Houseboat weekend",
            "duration_days": 2,
            "price": 400.0,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = get(&app, "/api/packages").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    let (_, filtered) = get(&app, &format!("/api/packages?destination_id={}", destination_id)).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["title"], "Houseboat weekend");

    let (status, _) = post(
        &app,
        "/api/packages",
        json!({ "title": "Bad", "duration_days": 2, "price": 100.0, "discounted_price": 150.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/api/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
