use chrono::{TimeZone, Utc};
use diagram_forge_core::types::*;

/// Build a small shop diagram programmatically, serialize to JSON,
/// deserialize back, and assert equality.
#[test]
fn shop_diagram_serde_roundtrip() {
    let diagram = build_shop_diagram();

    let json = serde_json::to_string_pretty(&diagram).unwrap();
    let back: Diagram = serde_json::from_str(&json).unwrap();

    assert_eq!(diagram, back);
    assert_eq!(back.tables.len(), 3);
    assert_eq!(back.references.len(), 2);
    assert_eq!(back.areas.len(), 1);

    let orders = back.table("orders").expect("orders table");
    assert!(orders.column("user_id").unwrap().fk);
    assert_eq!(orders.area_ids, vec![AreaId::for_name("sales")]);

    let sales = back.area("sales").expect("sales area");
    assert_eq!(sales.common_columns.len(), 1);
    assert_eq!(sales.label_vertical, Some(LabelVertical::Top));
}

#[test]
fn shop_diagram_json_shape() {
    let json = serde_json::to_value(build_shop_diagram()).unwrap();
    assert_eq!(json["database_type"], "PostgreSQL");
    assert_eq!(json["tables"][0]["id"], "table-users");
    assert_eq!(json["references"][0]["kind"], "many-to-one");
    assert_eq!(json["areas"][0]["table_ids"][0], "table-orders");
    assert_eq!(json["created_at"], "2024-01-02T03:04:05Z");
}

#[test]
fn shop_diagram_has_no_integrity_issues() {
    assert!(build_shop_diagram().integrity_issues().is_empty());
}

fn build_shop_diagram() -> Diagram {
    let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let mut diagram = Diagram::new(
        DiagramId::from_string("shop"),
        "Shop",
        DEFAULT_DATABASE_TYPE,
        timestamp,
    );
    diagram.project_name = Some("Shop".into());

    let mut users = Table::new(
        "users",
        vec![
            Column {
                pk: true,
                increment: true,
                ..Column::new("id", "serial")
            },
            Column {
                unique: true,
                not_null: true,
                ..Column::new("email", "varchar").with_type_params("255")
            },
        ],
    );
    users.color = Some(Color::new("#3366ff").unwrap());
    users.position = Some(Position::new(100.0, 40.0));

    let mut orders = Table::new(
        "orders",
        vec![
            Column {
                pk: true,
                ..Column::new("id", "serial")
            },
            Column::new("user_id", "integer"),
            Column {
                default: Some("now()".into()),
                ..Column::new("placed_at", "timestamp")
            },
        ],
    );
    orders.indexes.push(Index {
        unique: true,
        ..Index::new(vec!["user_id".into(), "placed_at".into()])
    });

    let items = Table::new(
        "order_items",
        vec![
            Column::new("order_id", "integer"),
            Column::new("price", "decimal").with_type_params("10,2"),
        ],
    );

    diagram.tables.extend([users, orders, items]);
    diagram.references.push(Reference::new(
        "orders",
        "user_id",
        "users",
        "id",
        RelationshipKind::ManyToOne,
    ));
    diagram.references.push(Reference::new(
        "order_items",
        "order_id",
        "orders",
        "id",
        RelationshipKind::ManyToOne,
    ));

    let mut sales = Area::new("sales");
    sales.table_ids = vec![TableId::for_name("orders"), TableId::for_name("order_items")];
    sales.label_vertical = Some(LabelVertical::Top);
    sales.common_columns.push(Column::new("created_at", "timestamp"));
    for id in sales.table_ids.clone() {
        if let Some(table) = diagram.table_by_id_mut(&id) {
            table.area_ids.push(sales.id.clone());
        }
    }
    diagram.areas.push(sales);
    diagram.mark_foreign_keys();
    diagram
}
