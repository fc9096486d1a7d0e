//! Integration tests for the tenant-scoped repository using in-memory
//! SurrealDB.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use harvest_core::error::HarvestError;
use harvest_core::models::customer::{CreateCustomer, CustomerFilter, UpdateCustomer};
use harvest_core::models::daily_log::{CreateDailyLog, DailyLogFilter};
use harvest_core::models::document::CreateDocument;
use harvest_core::models::follow_up_task::{
    CreateFollowUpTask, FollowUpTaskFilter, TaskStatus, UpdateFollowUpTask,
};
use harvest_core::models::invoice::{CreateInvoice, InvoiceStatus, UpdateInvoice};
use harvest_core::models::meeting::{CreateMeeting, MeetingFilter, UpdateMeeting};
use harvest_core::models::order::{
    CreateOrder, CreateOrderItem, OrderFilter, OrderItemFilter, OrderStatus, UpdateOrder,
};
use harvest_core::models::partnership::{
    CreatePartnership, PartnershipFilter, PartnershipKind, PartnershipStatus, UpdatePartnership,
};
use harvest_core::models::performance_metric::CreatePerformanceMetric;
use harvest_core::models::supplier::{CreateSupplier, SupplierFilter};
use harvest_core::models::transaction::{CreateTransaction, TransactionFilter, TransactionKind};
use harvest_core::repository::{Pagination, ScopedRepository};
use harvest_core::tenant::{BusinessProfile, TenantRegistry};
use harvest_db::repository::{
    CustomerRepository, DailyLogRepository, DocumentRepository, FollowUpTaskRepository,
    InvoiceRepository, MeetingRepository, OrderItemRepository, OrderRepository,
    PartnershipRepository, PerformanceMetricRepository, SupplierRepository,
    TransactionRepository,
};
use harvest_db::{audit_tenancy, run_migrations};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

const MAIN: &str = "jamaica-main";
const NORTH: &str = "jamaica-north";

fn registry() -> Arc<TenantRegistry> {
    let profile = |id: &str, active: bool| BusinessProfile {
        id: id.into(),
        name: id.into(),
        display_name: id.into(),
        tagline: String::new(),
        description: String::new(),
        location: "Jamaica".into(),
        primary_color: "#0B3D23".into(),
        accent_color: "#C9A122".into(),
        business_type: "wholesale".into(),
        modules: Vec::new(),
        active,
    };
    Arc::new(
        TenantRegistry::new(
            vec![
                profile(MAIN, true),
                profile(NORTH, true),
                profile("jamaica-west", false),
            ],
            MAIN.into(),
        )
        .unwrap(),
    )
}

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> (Surreal<Db>, Arc<TenantRegistry>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    let registry = registry();
    run_migrations(&db, &registry).await.unwrap();
    (db, registry)
}

fn order_for(customer_id: Uuid) -> CreateOrder {
    let order_date = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    CreateOrder {
        customer_id,
        order_date,
        delivery_date: order_date + Duration::days(2),
        total_amount: None,
        notes: None,
    }
}

fn item(order_id: Uuid, product: &str, quantity: f64, unit_price: f64) -> CreateOrderItem {
    CreateOrderItem {
        order_id,
        product_name: product.into(),
        quantity,
        unit_price,
    }
}

// -----------------------------------------------------------------------
// Tenant isolation
// -----------------------------------------------------------------------

#[tokio::test]
async fn same_name_in_two_tenants_stays_isolated() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);

    let main = repo
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let north = repo
        .create(NORTH, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    assert_eq!(main.tenant_id, MAIN);
    assert_eq!(north.tenant_id, NORTH);

    let main_list = repo
        .list(MAIN, CustomerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(main_list.total, 1);
    assert_eq!(main_list.items[0].id, main.id);

    // Another tenant's record looks exactly like a missing one.
    let err = repo.get(MAIN, north.id).await.unwrap_err();
    assert!(matches!(err, HarvestError::NotFound { .. }));
    let err = repo.delete(MAIN, north.id).await.unwrap_err();
    assert!(matches!(err, HarvestError::NotFound { .. }));
    assert_eq!(repo.get(NORTH, north.id).await.unwrap().name, "Sunset Resort");
}

#[tokio::test]
async fn unknown_and_inactive_tenants_are_rejected() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);

    for tenant in ["atlantis", "", "jamaica-west"] {
        let err = repo
            .create(tenant, CreateCustomer::named("Sunset Resort"))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, HarvestError::InvalidTenant { tenant_id } if tenant_id == tenant),
            "{err}"
        );
    }
    let err = repo
        .list("atlantis", CustomerFilter::default(), Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::InvalidTenant { .. }));
}

#[tokio::test]
async fn update_keeps_the_tenant() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);
    let customer = repo
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();

    let updated = repo
        .update(
            MAIN,
            customer.id,
            UpdateCustomer {
                phone: Some(Some("+1 876 555 0100".into())),
                satisfaction_score: Some(Some(9)),
                ..UpdateCustomer::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tenant_id, MAIN);
    assert_eq!(updated.phone.as_deref(), Some("+1 876 555 0100"));
    assert_eq!(updated.satisfaction_score, Some(9));
    assert_eq!(updated.name, "Sunset Resort");
    assert!(updated.updated_at >= customer.updated_at);

    // Updating through another tenant never reaches the record.
    let err = repo
        .update(NORTH, customer.id, UpdateCustomer::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NotFound { .. }));
}

#[tokio::test]
async fn rename_onto_existing_name_is_a_duplicate() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);
    let sunset = repo
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let bay = repo
        .create(MAIN, CreateCustomer::named("Montego Bay Grill"))
        .await
        .unwrap();

    let err = repo
        .update(
            MAIN,
            bay.id,
            UpdateCustomer {
                name: Some("Sunset Resort".into()),
                ..UpdateCustomer::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarvestError::DuplicateEntity { entity: "customer", existing_id } if existing_id == sunset.id
    ));

    // Renaming a record to its own name is not a conflict.
    repo.update(
        MAIN,
        sunset.id,
        UpdateCustomer {
            name: Some("Sunset Resort".into()),
            ..UpdateCustomer::default()
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn invalid_input_is_rejected_before_storage() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);

    let err = repo
        .create(MAIN, CreateCustomer::named("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Validation { .. }));

    let mut input = CreateCustomer::named("Sunset Resort");
    input.email = Some("not-an-email".into());
    let err = repo.create(MAIN, input).await.unwrap_err();
    assert!(matches!(err, HarvestError::Validation { .. }));

    let list = repo
        .list(MAIN, CustomerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(list.total, 0);
}

#[tokio::test]
async fn list_paginates_in_insertion_order() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);
    let names = ["Alpha Hotel", "Bravo Cafe", "Charlie Inn", "Delta Lodge", "Echo Villa"];
    for name in names {
        repo.create(MAIN, CreateCustomer::named(name)).await.unwrap();
    }
    repo.create(NORTH, CreateCustomer::named("Foxtrot Bar"))
        .await
        .unwrap();

    let page = repo
        .list(
            MAIN,
            CustomerFilter::default(),
            Pagination {
                offset: 2,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    let page_names: Vec<&str> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(page_names, ["Charlie Inn", "Delta Lodge"]);

    let filtered = repo
        .list(
            MAIN,
            CustomerFilter {
                name: Some("Echo Villa".into()),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.items[0].name, "Echo Villa");
}

#[tokio::test]
async fn concurrent_duplicate_creates_admit_one() {
    let (db, registry) = setup().await;
    let repo = CustomerRepository::new(db, registry);

    let (a, b) = tokio::join!(
        repo.create(MAIN, CreateCustomer::named("Sunset Resort")),
        repo.create(MAIN, CreateCustomer::named("Sunset Resort")),
    );
    let (winner, loser) = match (a, b) {
        (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
        other => panic!("expected exactly one create to succeed, got {other:?}"),
    };
    assert!(
        matches!(
            loser,
            HarvestError::DuplicateEntity { existing_id, .. } if existing_id == winner.id
        ),
        "{loser:?}"
    );

    let list = repo
        .list(MAIN, CustomerFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(list.total, 1);
}

#[tokio::test]
async fn update_cannot_move_delivery_before_order_date() {
    let (db, registry) = setup().await;
    let customers = CustomerRepository::new(db.clone(), Arc::clone(&registry));
    let orders = OrderRepository::new(db, registry);

    let customer = customers
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let input = order_for(customer.id);
    let order_date = input.order_date;
    let order = orders.create(MAIN, input).await.unwrap();

    let err = orders
        .update(
            MAIN,
            order.id,
            UpdateOrder {
                delivery_date: Some(order_date - Duration::days(1)),
                ..UpdateOrder::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Validation { .. }), "{err:?}");

    let stored = orders.get(MAIN, order.id).await.unwrap();
    assert_eq!(stored.delivery_date, order.delivery_date);
}

// -----------------------------------------------------------------------
// References and deletion
// -----------------------------------------------------------------------

#[tokio::test]
async fn references_must_resolve_within_the_tenant() {
    let (db, registry) = setup().await;
    let customers = CustomerRepository::new(db.clone(), Arc::clone(&registry));
    let orders = OrderRepository::new(db, registry);

    let north_customer = customers
        .create(NORTH, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();

    let err = orders
        .create(MAIN, order_for(north_customer.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarvestError::ReferenceNotFound { entity: "customer", field: "customer_id", id }
            if id == north_customer.id
    ));

    let order = orders
        .create(NORTH, order_for(north_customer.id))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, north_customer.id);
}

#[tokio::test]
async fn delete_is_restricted_until_cascade() {
    let (db, registry) = setup().await;
    let customers = CustomerRepository::new(db.clone(), Arc::clone(&registry));
    let orders = OrderRepository::new(db.clone(), Arc::clone(&registry));
    let items = OrderItemRepository::new(db.clone(), Arc::clone(&registry));
    let invoices = InvoiceRepository::new(db, registry);

    let customer = customers
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let order = orders.create(MAIN, order_for(customer.id)).await.unwrap();
    let line = items
        .create(MAIN, item(order.id, "Scotch bonnet peppers", 4.0, 2.5))
        .await
        .unwrap();
    assert_eq!(line.tenant_id, MAIN);
    assert!((line.subtotal() - 10.0).abs() < f64::EPSILON);
    items
        .create(MAIN, item(order.id, "Callaloo", 2.0, 3.0))
        .await
        .unwrap();
    let invoice = invoices
        .create(
            MAIN,
            CreateInvoice {
                order_id: order.id,
                customer_id: customer.id,
                invoice_date: order.delivery_date,
                due_date: order.delivery_date + Duration::days(30),
                total_amount: 16.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);

    let err = customers.delete(MAIN, customer.id).await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::HasDependents { dependent: "sales_order", .. }
    ));
    let err = orders.delete(MAIN, order.id).await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::HasDependents { dependent: "order_item", .. }
    ));

    customers.delete_cascade(MAIN, customer.id).await.unwrap();

    assert!(matches!(
        orders.get(MAIN, order.id).await.unwrap_err(),
        HarvestError::NotFound { .. }
    ));
    assert!(matches!(
        invoices.get(MAIN, invoice.id).await.unwrap_err(),
        HarvestError::NotFound { .. }
    ));
    let remaining = items
        .list(
            MAIN,
            OrderItemFilter {
                order_id: Some(order.id),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(remaining.total, 0);
}

#[tokio::test]
async fn cascade_never_crosses_tenants() {
    let (db, registry) = setup().await;
    let customers = CustomerRepository::new(db.clone(), Arc::clone(&registry));
    let orders = OrderRepository::new(db, registry);

    let main = customers
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let north = customers
        .create(NORTH, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    orders.create(MAIN, order_for(main.id)).await.unwrap();
    let north_order = orders.create(NORTH, order_for(north.id)).await.unwrap();

    customers.delete_cascade(MAIN, main.id).await.unwrap();

    let survivor = orders.get(NORTH, north_order.id).await.unwrap();
    assert_eq!(survivor.customer_id, north.id);
    let main_orders = orders
        .list(MAIN, OrderFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(main_orders.total, 0);
}

#[tokio::test]
async fn one_invoice_per_order() {
    let (db, registry) = setup().await;
    let customers = CustomerRepository::new(db.clone(), Arc::clone(&registry));
    let orders = OrderRepository::new(db.clone(), Arc::clone(&registry));
    let invoices = InvoiceRepository::new(db, registry);

    let customer = customers
        .create(MAIN, CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let order = orders.create(MAIN, order_for(customer.id)).await.unwrap();
    let create = || CreateInvoice {
        order_id: order.id,
        customer_id: customer.id,
        invoice_date: order.delivery_date,
        due_date: order.delivery_date + Duration::days(14),
        total_amount: 120.0,
    };

    let first = invoices.create(MAIN, create()).await.unwrap();
    let err = invoices.create(MAIN, create()).await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::DuplicateEntity { entity: "invoice", existing_id } if existing_id == first.id
    ));

    let paid = invoices
        .update(
            MAIN,
            first.id,
            UpdateInvoice {
                status: Some(InvoiceStatus::Paid),
                ..UpdateInvoice::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let delivered = orders
        .update(
            MAIN,
            order.id,
            UpdateOrder {
                status: Some(OrderStatus::Delivered),
                ..UpdateOrder::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

// -----------------------------------------------------------------------
// Filters
// -----------------------------------------------------------------------

#[tokio::test]
async fn suppliers_filter_by_specialty() {
    let (db, registry) = setup().await;
    let repo = SupplierRepository::new(db, registry);

    let mut farm = CreateSupplier::named("Blue Mountain Farm");
    farm.product_specialties = vec!["coffee".into(), "yam".into()];
    repo.create(MAIN, farm).await.unwrap();
    let mut grove = CreateSupplier::named("St. Mary Grove");
    grove.product_specialties = vec!["breadfruit".into()];
    repo.create(MAIN, grove).await.unwrap();

    let coffee = repo
        .list(
            MAIN,
            SupplierFilter {
                product: Some("coffee".into()),
                ..SupplierFilter::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(coffee.total, 1);
    assert_eq!(coffee.items[0].name, "Blue Mountain Farm");
}

#[tokio::test]
async fn transactions_filter_by_kind_and_date_range() {
    let (db, registry) = setup().await;
    let repo = TransactionRepository::new(db, registry);
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap();
    let entries = [
        (day(1), TransactionKind::Income, 500.0),
        (day(10), TransactionKind::Expense, 120.0),
        (day(20), TransactionKind::Income, 300.0),
    ];
    for (date, kind, amount) in entries {
        repo.create(
            MAIN,
            CreateTransaction {
                date,
                kind,
                description: "Weekly delivery".into(),
                amount,
                related_entity_id: None,
                related_entity_type: None,
            },
        )
        .await
        .unwrap();
    }

    let income = repo
        .list(
            MAIN,
            TransactionFilter {
                kind: Some(TransactionKind::Income),
                from: Some(day(1)),
                to: Some(day(15)),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(income.total, 1);
    assert!((income.items[0].signed_amount() - 500.0).abs() < f64::EPSILON);

    let all = repo
        .list(MAIN, TransactionFilter::default(), Pagination::default())
        .await
        .unwrap();
    let net: f64 = all.items.iter().map(|t| t.signed_amount()).sum();
    assert!((net - 680.0).abs() < 1e-9);
}

#[tokio::test]
async fn daily_logs_are_unique_per_date_and_tenant() {
    let (db, registry) = setup().await;
    let repo = DailyLogRepository::new(db, registry);
    let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

    let mut log = CreateDailyLog::for_date(date);
    log.temperature_logs = Some(serde_json::json!([{ "time": "06:00", "celsius": 4.5 }]));
    let created = repo.create(MAIN, log).await.unwrap();
    assert_eq!(created.log_date, date);
    assert_eq!(created.temperature_logs[0]["celsius"], 4.5);

    let err = repo
        .create(MAIN, CreateDailyLog::for_date(date))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::DuplicateEntity { .. }));
    repo.create(NORTH, CreateDailyLog::for_date(date))
        .await
        .unwrap();

    let june = repo
        .list(
            MAIN,
            DailyLogFilter {
                from: NaiveDate::from_ymd_opt(2024, 6, 1),
                to: NaiveDate::from_ymd_opt(2024, 6, 30),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(june.total, 1);
}

#[tokio::test]
async fn document_paths_and_metric_names_are_unique_per_tenant() {
    let (db, registry) = setup().await;
    let documents = DocumentRepository::new(db.clone(), Arc::clone(&registry));
    let metrics = PerformanceMetricRepository::new(db, registry);

    let agreement = |name: &str| CreateDocument {
        name: name.into(),
        file_path: "documents/supplier_agreement.pdf".into(),
        kind: Some("Contract".into()),
        version: Some("1.0".into()),
    };
    let first = documents
        .create(MAIN, agreement("Supplier Agreement"))
        .await
        .unwrap();
    let err = documents
        .create(MAIN, agreement("Supplier Agreement v2"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarvestError::DuplicateEntity { existing_id, .. } if existing_id == first.id
    ));
    documents
        .create(NORTH, agreement("Supplier Agreement"))
        .await
        .unwrap();

    let on_time = |value: f64| CreatePerformanceMetric {
        name: "On-time delivery".into(),
        value,
        date: Utc::now(),
        notes: None,
    };
    let metric = metrics.create(MAIN, on_time(0.94)).await.unwrap();
    assert!((metric.value - 0.94).abs() < f64::EPSILON);
    assert!(matches!(
        metrics.create(MAIN, on_time(0.97)).await.unwrap_err(),
        HarvestError::DuplicateEntity { .. }
    ));
    metrics.create(NORTH, on_time(0.88)).await.unwrap();
}

#[tokio::test]
async fn meetings_filter_by_window_and_reminders() {
    let (db, registry) = setup().await;
    let meetings = MeetingRepository::new(db, registry);
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 5, d, 10, 0, 0).unwrap();

    let mut ids = Vec::new();
    for (d, title) in [(2, "Supplier review"), (9, "Menu tasting"), (20, "Quarterly plan")] {
        let meeting = meetings
            .create(
                MAIN,
                CreateMeeting {
                    title: title.into(),
                    date_time: day(d),
                    attendees: vec!["Marcia".into()],
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert!(!meeting.reminders_sent);
        ids.push(meeting.id);
    }

    let reminded = meetings
        .update(
            MAIN,
            ids[1],
            UpdateMeeting {
                reminders_sent: Some(true),
                ..UpdateMeeting::default()
            },
        )
        .await
        .unwrap();
    assert!(reminded.reminders_sent);
    assert_eq!(reminded.attendees, ["Marcia"]);

    let window = meetings
        .list(
            MAIN,
            MeetingFilter {
                from: Some(day(1)),
                to: Some(day(10)),
                reminders_sent: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    let titles: Vec<&str> = window.items.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["Supplier review", "Menu tasting"]);

    let pending = meetings
        .list(
            MAIN,
            MeetingFilter {
                reminders_sent: Some(false),
                ..MeetingFilter::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.total, 2);
    assert!(pending.items.iter().all(|m| m.id != ids[1]));
}

#[tokio::test]
async fn tasks_and_partnerships_filter_by_status() {
    let (db, registry) = setup().await;
    let tasks = FollowUpTaskRepository::new(db.clone(), Arc::clone(&registry));
    let partnerships = PartnershipRepository::new(db, registry);

    let customer_id = Uuid::now_v7();
    let call = tasks
        .create(
            MAIN,
            CreateFollowUpTask {
                description: "Call about weekly produce order".into(),
                due_date: Some(Utc::now() - Duration::days(1)),
                assigned_to: Some("Devon".into()),
                related_entity_id: Some(customer_id),
                related_entity_type: Some("customer".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(call.status, TaskStatus::Pending);
    assert!(call.is_overdue(Utc::now()));
    tasks
        .create(
            MAIN,
            CreateFollowUpTask {
                description: "Send revised price list".into(),
                due_date: None,
                assigned_to: None,
                related_entity_id: None,
                related_entity_type: None,
            },
        )
        .await
        .unwrap();

    let done = tasks
        .update(
            MAIN,
            call.id,
            UpdateFollowUpTask {
                status: Some(TaskStatus::Completed),
                ..UpdateFollowUpTask::default()
            },
        )
        .await
        .unwrap();
    assert!(!done.is_overdue(Utc::now()));

    let pending = tasks
        .list(
            MAIN,
            FollowUpTaskFilter {
                status: Some(TaskStatus::Pending),
                ..FollowUpTaskFilter::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.total, 1);
    assert_eq!(pending.items[0].description, "Send revised price list");
    let related = tasks
        .list(
            MAIN,
            FollowUpTaskFilter {
                related_entity_id: Some(customer_id),
                ..FollowUpTaskFilter::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(related.total, 1);
    assert_eq!(related.items[0].id, call.id);

    let resort = partnerships
        .create(
            MAIN,
            CreatePartnership {
                name: "Sunset Resort".into(),
                kind: Some(PartnershipKind::Customer),
                contact_person: None,
                status: PartnershipStatus::Prospect,
                notes: None,
            },
        )
        .await
        .unwrap();
    partnerships
        .update(
            MAIN,
            resort.id,
            UpdatePartnership {
                status: Some(PartnershipStatus::Active),
                ..UpdatePartnership::default()
            },
        )
        .await
        .unwrap();
    let active = partnerships
        .list(
            MAIN,
            PartnershipFilter {
                status: Some(PartnershipStatus::Active),
                kind: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(active.total, 1);
    assert_eq!(active.items[0].kind, Some(PartnershipKind::Customer));

    let other_tenant = partnerships
        .list(NORTH, PartnershipFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(other_tenant.total, 0);
}

#[tokio::test]
async fn repository_writes_pass_the_tenancy_audit() {
    let (db, registry) = setup().await;
    let customers = CustomerRepository::new(db.clone(), Arc::clone(&registry));
    let orders = OrderRepository::new(db.clone(), Arc::clone(&registry));

    for tenant in [MAIN, NORTH] {
        let customer = customers
            .create(tenant, CreateCustomer::named("Sunset Resort"))
            .await
            .unwrap();
        orders.create(tenant, order_for(customer.id)).await.unwrap();
    }

    let audit = audit_tenancy(&db, &registry).await.unwrap();
    assert!(audit.is_clean(), "{:?}", audit.violations);
    let customer_counts = audit.tables.iter().find(|t| t.table == "customer").unwrap();
    assert_eq!(customer_counts.total, 2);
    assert_eq!(customer_counts.per_tenant[MAIN], 1);
    assert_eq!(customer_counts.per_tenant[NORTH], 1);
}
