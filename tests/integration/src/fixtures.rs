//! Test fixtures for integration tests

use serde_json::{json, Value};

/// Swagger 2.0 petstore contract served by the mock gateway.
pub const PETSTORE_CONTRACT: &str =
    include_str!("../../../crates/gateway-contract/fixtures/petstore.json");

/// Recorded pretty-printed request schema of `POST /pet`.
pub const PET_SCHEMA_PRETTY: &str =
    include_str!("../../../crates/gateway-contract/fixtures/pet_schema.pretty.json");

/// A small OpenAPI 3 contract in YAML.
pub const INVENTORY_CONTRACT_YAML: &str = r##"openapi: 3.0.3
info:
  title: Inventory
  version: 1.4.0
servers:
  - url: https://gateway.example.com/inventory/
paths:
  /items:
    post:
      requestBody:
        $ref: "#/components/requestBodies/Item"
      responses:
        "201":
          description: created
  /items/{sku}:
    delete:
      responses:
        "204":
          description: deleted
components:
  requestBodies:
    Item:
      content:
        application/json:
          schema:
            $ref: "#/components/schemas/Item"
  schemas:
    Item:
      type: object
      required: [sku, quantity]
      properties:
        sku:
          type: string
        quantity:
          type: integer
        restocked:
          type: string
          format: date
"##;

/// A pet body that satisfies the contract.
pub fn valid_pet() -> Value {
    json!({
        "id": 12,
        "category": {"id": 1, "name": "dogs"},
        "name": "doggie",
        "photoUrls": ["https://example.com/doggie.png"],
        "tags": [{"id": 3, "name": "friendly"}],
        "status": "available"
    })
}

/// An order body that satisfies the contract.
pub fn valid_order() -> Value {
    json!({
        "id": 7,
        "petId": 12,
        "quantity": 1,
        "shipDate": "2024-05-01T10:00:00Z",
        "status": "placed",
        "complete": false
    })
}
