mod common;

use axum::http::StatusCode;
use common::{category, dish, employee, location, supplier, TestApp};
use serde_json::json;

async fn five_dishes(app: &TestApp) {
    for name in ["Ramen", "Pho", "Tacos", "Curry", "Paella"] {
        app.create("/dishes", dish(name)).await;
    }
}

#[tokio::test]
async fn deleting_middle_dish_moves_last_dish_and_its_references() {
    let app = TestApp::new().await;
    five_dishes(&app).await;
    let category_id = app.create("/supply-categories", category("Seafood")).await;
    let requirement = app
        .create(
            "/dish-requirements",
            json!({ "DishId": 5, "SupplyCategoryId": category_id }),
        )
        .await;
    let item = app
        .create("/menu-items", json!({ "MenuId": 1, "DishId": 5 }))
        .await;

    let response = app.delete("/dishes/2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.count("/dishes").await, 4);
    assert_eq!(app.get("/dishes/2/basic").await.body["Name"], "Paella");
    assert_eq!(app.get("/dishes/5/basic").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get(&format!("/dish-requirements/{}/basic", requirement))
            .await
            .body["DishId"],
        2
    );
    assert_eq!(
        app.get(&format!("/menu-items/{}/basic", item)).await.body["DishId"],
        2
    );
}

#[tokio::test]
async fn deleting_referenced_dish_blanks_it() {
    let app = TestApp::new().await;
    five_dishes(&app).await;
    app.create("/menu-items", json!({ "MenuId": 1, "DishId": 1 }))
        .await;

    let response = app.delete("/dishes/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.count("/dishes").await, 5);
    let blanked = app.get("/dishes/1/basic").await;
    assert!(blanked.body["Name"].as_str().unwrap().contains("Unknown"));
    assert_eq!(app.get("/menu-items/1/basic").await.body["DishId"], 1);
}

#[tokio::test]
async fn blanking_twice_changes_nothing() {
    let app = TestApp::new().await;
    five_dishes(&app).await;
    app.create("/menu-items", json!({ "MenuId": 2, "DishId": 3 }))
        .await;

    app.delete("/dishes/3").await;
    let first = app.get("/dishes/3/basic").await.body;
    let response = app.delete("/dishes/3").await;
    let second = app.get("/dishes/3/basic").await.body;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(app.count("/dishes").await, 5);
}

#[tokio::test]
async fn blanked_row_is_compacted_once_dependents_are_gone() {
    let app = TestApp::new().await;
    five_dishes(&app).await;
    app.create("/menu-items", json!({ "MenuId": 1, "DishId": 1 }))
        .await;
    app.delete("/dishes/1").await;

    assert_eq!(app.delete("/menu-items/1").await.status, StatusCode::OK);
    assert_eq!(app.delete("/dishes/1").await.status, StatusCode::OK);

    assert_eq!(app.count("/dishes").await, 4);
    assert_eq!(app.get("/dishes/1/basic").await.body["Name"], "Paella");
}

#[tokio::test]
async fn deleting_last_row_truncates() {
    let app = TestApp::new().await;
    five_dishes(&app).await;

    assert_eq!(app.delete("/dishes/5").await.status, StatusCode::OK);

    assert_eq!(app.ids("/dishes").await, vec![1, 2, 3, 4]);
    assert_eq!(app.get("/dishes/4/basic").await.body["Name"], "Curry");
}

#[tokio::test]
async fn next_create_reuses_freed_id() {
    let app = TestApp::new().await;
    five_dishes(&app).await;
    app.delete("/dishes/1").await;

    assert_eq!(app.create("/dishes", dish("Udon")).await, 5);
}

#[tokio::test]
async fn location_compaction_migrates_employees_management_and_links() {
    let app = TestApp::new().await;
    app.create("/locations", location("Salem", "2015-05-05")).await;
    let moved = app.create("/locations", location("Bend", "2019-09-09")).await;
    let employee_id = app
        .create("/employees", employee("Ann", "Lee", moved, 40, "2020-01-06"))
        .await;
    app.create(
        "/managements",
        json!({ "LocationId": moved, "ManagerId": employee_id }),
    )
    .await;
    let supplier_id = app.create("/suppliers", supplier("Harbor Foods", "Seattle")).await;
    let category_id = app.create("/supply-categories", category("Seafood")).await;
    app.create(
        "/supplier-stocks",
        json!({ "SupplierId": supplier_id, "SupplyCategoryId": category_id }),
    )
    .await;
    app.create(
        "/supply-links",
        json!({ "LocationId": moved, "SupplierId": supplier_id, "SupplyCategoryId": category_id }),
    )
    .await;

    assert_eq!(app.delete("/locations/1").await.status, StatusCode::OK);

    assert_eq!(app.count("/locations").await, 1);
    assert_eq!(app.get("/locations/1/basic").await.body["City"], "Bend");
    assert_eq!(app.get("/employees/1/basic").await.body["LocationId"], 1);
    assert_eq!(app.get("/managements/1/basic").await.body["LocationId"], 1);
    assert_eq!(app.get("/supply-links/1/basic").await.body["LocationId"], 1);
    assert_eq!(app.get("/locations/1").await.body["Manager"], "Ann Lee");
}

#[tokio::test]
async fn employee_with_management_is_blanked() {
    let app = TestApp::new().await;
    let location_id = app.create("/locations", location("Salem", "2015-05-05")).await;
    let manager = app
        .create("/employees", employee("Ann", "Lee", location_id, 40, "2020-01-06"))
        .await;
    app.create(
        "/managements",
        json!({ "LocationId": location_id, "ManagerId": manager }),
    )
    .await;

    assert_eq!(
        app.delete(&format!("/employees/{}", manager)).await.status,
        StatusCode::OK
    );

    let blanked = app.get(&format!("/employees/{}/basic", manager)).await.body;
    assert_eq!(blanked["FirstName"], "Unknown");
    assert_eq!(blanked["LastName"], "Employee");
    assert_eq!(blanked["WeeklyHours"], 0);
    assert_eq!(blanked["StartedOn"], "0001-01-01");
    assert_eq!(blanked["PositionId"], 2);
    assert_eq!(blanked["LocationId"], location_id);
}

#[tokio::test]
async fn location_with_employees_is_blanked() {
    let app = TestApp::new().await;
    let mut body = location("Salem", "2015-05-05");
    body["MenuId"] = json!(3);
    body["ScheduleId"] = json!(2);
    let location_id = app.create("/locations", body).await;
    app.create("/employees", employee("Ann", "Lee", location_id, 40, "2020-01-06"))
        .await;

    assert_eq!(app.delete("/locations/1").await.status, StatusCode::OK);

    let blanked = app.get("/locations/1/basic").await.body;
    assert_eq!(blanked["City"], "None");
    assert_eq!(blanked["CountryCode"], "XX");
    assert_eq!(blanked["OpenSince"], "0001-01-01");
    assert_eq!(blanked["MenuId"], 1);
    assert_eq!(blanked["ScheduleId"], 1);
    assert_eq!(app.count("/locations").await, 1);
    assert_eq!(app.get("/locations/1").await.body["Blanked"], true);
}

#[tokio::test]
async fn supplier_and_category_blanks_keep_names_distinct() {
    let app = TestApp::new().await;
    let first = app.create("/suppliers", supplier("Harbor Foods", "Seattle")).await;
    let second = app.create("/suppliers", supplier("Valley Farms", "Yakima")).await;
    let category_id = app.create("/supply-categories", category("Produce")).await;
    for supplier_id in [first, second] {
        app.create(
            "/supplier-stocks",
            json!({ "SupplierId": supplier_id, "SupplyCategoryId": category_id }),
        )
        .await;
    }

    app.delete("/suppliers/1").await;
    app.delete("/suppliers/2").await;
    app.delete("/supply-categories/1").await;

    assert_eq!(
        app.get("/suppliers/1/basic").await.body["Name"],
        "Missing Supplier 1"
    );
    assert_eq!(
        app.get("/suppliers/2/basic").await.body["Name"],
        "Missing Supplier 2"
    );
    assert_eq!(
        app.get("/supply-categories/1/basic").await.body["Name"],
        "Empty Category 1"
    );
}

#[tokio::test]
async fn join_rows_are_always_removed() {
    let app = TestApp::new().await;
    five_dishes(&app).await;
    for dish_id in 1..=3 {
        app.create("/menu-items", json!({ "MenuId": 1, "DishId": dish_id }))
            .await;
    }

    assert_eq!(app.delete("/menu-items/1").await.status, StatusCode::OK);

    assert_eq!(app.count("/menu-items").await, 2);
    assert_eq!(app.get("/menu-items/1/basic").await.body["DishId"], 3);
}

#[tokio::test]
async fn delete_reports_its_outcome() {
    let app = TestApp::new().await;
    five_dishes(&app).await;

    let response = app.delete("/dishes/2").await;

    assert_eq!(response.body["outcome"], "Compacted");
    assert_eq!(response.body["moved_from"], 5);
}

#[tokio::test]
async fn blanked_names_stay_unique_through_compaction() {
    let app = TestApp::new().await;
    for name in ["Ramen", "Pho", "Tacos"] {
        app.create("/dishes", dish(name)).await;
    }
    app.create("/menu-items", json!({ "MenuId": 1, "DishId": 3 }))
        .await;
    app.delete("/dishes/3").await;
    app.delete("/dishes/1").await;
    app.create("/dishes", dish("Udon")).await;
    app.create("/menu-items", json!({ "MenuId": 2, "DishId": 3 }))
        .await;

    app.delete("/dishes/3").await;

    assert_eq!(app.get("/dishes/1/basic").await.body["Name"], "Unknown Dish 1");
    assert_eq!(app.get("/dishes/3/basic").await.body["Name"], "Unknown Dish 3");
    let keep_own_name = app.put("/dishes/1", dish("Unknown Dish 1")).await;
    assert_eq!(keep_own_name.status, StatusCode::OK);
}

#[tokio::test]
async fn blank_name_taken_by_a_client_gets_a_suffix() {
    let app = TestApp::new().await;
    app.create("/suppliers", supplier("Harbor Foods", "Seattle")).await;
    app.create("/suppliers", supplier("Missing Supplier 1", "Tacoma"))
        .await;
    let category_id = app.create("/supply-categories", category("Produce")).await;
    app.create(
        "/supplier-stocks",
        json!({ "SupplierId": 1, "SupplyCategoryId": category_id }),
    )
    .await;

    assert_eq!(app.delete("/suppliers/1").await.body["outcome"], "Blanked");

    assert_eq!(
        app.get("/suppliers/1/basic").await.body["Name"],
        "Missing Supplier 1-2"
    );
    assert_eq!(
        app.put("/suppliers/2", supplier("Missing Supplier 1", "Tacoma"))
            .await
            .status,
        StatusCode::OK
    );
}
