// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Endpoint tests for POST /classify

use super::fixtures::*;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::GenericImageView;
use image_classifier_node::api::ApiConfig;
use tower::ServiceExt;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

fn decode_data_uri(uri: &str) -> image::DynamicImage {
    let payload = uri.strip_prefix(DATA_URI_PREFIX).expect("jpeg data uri");
    let bytes = STANDARD.decode(payload).unwrap();
    image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap()
}

#[tokio::test]
async fn test_classify_cat_jpeg() {
    let app = cat_dog_app();

    let response = app
        .oneshot(classify_request("cat.jpg", &jpeg_bytes(100, 100)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["prediction"], "cat");
    assert_eq!(body["confidence"].as_f64(), Some(0.92));
    assert_eq!(body["details"]["cat"].as_f64(), Some(0.92));
    assert_eq!(body["details"]["dog"].as_f64(), Some(0.08));
    assert_eq!(body.as_object().unwrap().len(), 4);

    let image = body["image"].as_str().unwrap();
    assert!(image.starts_with(DATA_URI_PREFIX));
    assert_eq!(decode_data_uri(image).dimensions(), (100, 100));
}

#[tokio::test]
async fn test_uppercase_png_extension_accepted() {
    let app = cat_dog_app();

    let response = app
        .oneshot(classify_request("PHOTO.PNG", &rgba_png_bytes(32, 20)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    // Alpha is dropped, dimensions survive the JPEG round trip
    let decoded = decode_data_uri(body["image"].as_str().unwrap());
    assert_eq!(decoded.dimensions(), (32, 20));
    assert_eq!(decoded.color(), image::ColorType::Rgb8);
}

#[tokio::test]
async fn test_jpeg_extension_accepted() {
    let response = cat_dog_app()
        .oneshot(classify_request("holiday.Jpeg", &jpeg_bytes(16, 16)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_extension_rejected_even_with_valid_image() {
    let response = cat_dog_app()
        .oneshot(classify_request("cat.gif", &jpeg_bytes(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Invalid file type");
}

#[tokio::test]
async fn test_invalid_extension_rejected_before_decoding() {
    let response = cat_dog_app()
        .oneshot(classify_request("notes.txt", b"just some text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Invalid file type");
}

#[tokio::test]
async fn test_missing_extension_rejected() {
    let response = cat_dog_app()
        .oneshot(classify_request("jpg", &jpeg_bytes(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_image_bytes_fail_classification() {
    let response = cat_dog_app()
        .oneshot(classify_request("broken.jpg", b"these bytes are not a jpeg"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Classification failed: "));
}

#[tokio::test]
async fn test_classifier_failure_reported() {
    let response = app_with(FailingClassifier::new())
        .oneshot(classify_request("cat.png", &rgba_png_bytes(8, 8)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(
        body["detail"],
        "Classification failed: Inference failed: model exploded"
    );
}

#[tokio::test]
async fn test_missing_file_field() {
    let body = multipart_body("upload", "cat.jpg", "image/jpeg", &jpeg_bytes(10, 10));

    let response = cat_dog_app()
        .oneshot(multipart_request(body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Field 'file' is required");
}

#[tokio::test]
async fn test_json_body_rejected_with_json_error() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/classify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = cat_dog_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid multipart body: "));
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_multipart_without_boundary_rejected_with_json_error() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/classify")
        .header(header::CONTENT_TYPE, "multipart/form-data")
        .body(Body::from("{}"))
        .unwrap();

    let response = cat_dog_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid multipart body: "));
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_details_cover_vocabulary() {
    let app = app_with(FixedClassifier::new(
        &["grizzly", "black", "teddy"],
        &[0.15, 0.25, 0.6],
    ));

    let response = app
        .oneshot(classify_request("bear.jpeg", &jpeg_bytes(40, 30)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    let details = body["details"].as_object().unwrap();
    let keys: Vec<&str> = details.keys().map(|k| k.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["black", "grizzly", "teddy"]);

    let total: f64 = details.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-5);

    // Prediction is the most probable label and confidence is its probability
    assert_eq!(body["prediction"], "teddy");
    let best = details
        .values()
        .map(|v| v.as_f64().unwrap())
        .fold(f64::MIN, f64::max);
    assert_eq!(body["confidence"].as_f64(), Some(best));
    assert_eq!(body["confidence"], details["teddy"]);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let config = ApiConfig {
        max_upload_bytes: 1024,
        ..ApiConfig::default()
    };
    let app = app_with_config(FixedClassifier::new(&["cat", "dog"], &[0.5, 0.5]), &config);

    let response = app
        .oneshot(classify_request("big.png", &vec![0u8; 8 * 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_get_not_allowed() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/classify")
        .body(Body::empty())
        .unwrap();

    let response = cat_dog_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/classify")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = cat_dog_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_header_on_classify_response() {
    let mut request = classify_request("cat.jpg", &jpeg_bytes(12, 12));
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://localhost:3000".parse().unwrap());

    let response = cat_dog_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
