// Unit tests for backdesk
// These tests work with the public API without modifying the main codebase

mod validation_tests {
    use backdesk::model::{Customer, Product};
    use backdesk::resource::Resource;
    use backdesk::validate;

    fn spec_for<T: Resource>(key: &str) -> &'static backdesk::resource::FieldSpec {
        T::field_specs().iter().find(|s| s.key == key).unwrap()
    }

    #[test]
    fn phone_must_be_exactly_ten_digits() {
        let spec = spec_for::<Customer>("phone");
        assert!(validate::check_field(spec, "0123456789").is_none());
        assert!(validate::check_field(spec, "12345").is_some());
        assert!(validate::check_field(spec, "01234567890").is_some());
        assert!(validate::check_field(spec, "01234abcde").is_some());
    }

    #[test]
    fn email_needs_an_at_sign_with_text_around_it() {
        let spec = spec_for::<Customer>("email");
        assert!(validate::check_field(spec, "a@example.com").is_none());
        assert!(validate::check_field(spec, "not-an-email").is_some());
        assert!(validate::check_field(spec, "@example.com").is_some());
    }

    #[test]
    fn price_rejects_negatives_and_garbage() {
        let spec = spec_for::<Product>("price");
        assert!(validate::check_field(spec, "19.99").is_none());
        assert!(validate::check_field(spec, "0").is_none());
        assert!(validate::check_field(spec, "-1").is_some());
        assert!(validate::check_field(spec, "cheap").is_some());
    }

    #[test]
    fn required_fields_reject_blank_input() {
        let spec = spec_for::<Customer>("name");
        assert!(validate::check_field(spec, "").is_some());
        assert!(validate::check_field(spec, "  ").is_some());
        assert!(validate::check_field(spec, "A").is_some()); // below min length
        assert!(validate::check_field(spec, "Al").is_none());
    }
}

mod record_tests {
    use backdesk::model::{Customer, Product};
    use backdesk::resource::{Resource, ResourceKind};

    #[test]
    fn kinds_expose_route_slugs_and_plurals() {
        assert_eq!(ResourceKind::Customer.slug(), "customer");
        assert_eq!(ResourceKind::Customer.plural(), "customers");
        assert_eq!(ResourceKind::Inventory.plural(), "inventories");
        assert_eq!(ResourceKind::Category.plural(), "categories");
    }

    #[test]
    fn field_access_is_symmetric_for_text_fields() {
        let mut c = Customer::default();
        c.set("name", "Alice").unwrap();
        c.set("email", "a@example.com").unwrap();
        assert_eq!(c.get("name"), "Alice");
        assert_eq!(c.get("email"), "a@example.com");
    }

    #[test]
    fn search_matches_any_searchable_field_case_insensitively() {
        let mut p = Product::default();
        p.set("name", "Blue Widget").unwrap();
        p.set("barcode", "4006381333931").unwrap();
        assert!(p.matches("widget"));
        assert!(p.matches("WIDGET"));
        assert!(p.matches("400638"));
        assert!(!p.matches("gadget"));
    }
}

mod list_flow_tests {
    use backdesk::listman::ListManager;
    use backdesk::model::Customer;
    use backdesk::resource::Resource;
    use chrono::DateTime;
    use std::time::{Duration, Instant};

    fn seed(n: usize) -> Vec<Customer> {
        (0..n)
            .map(|i| Customer {
                customer_id: format!("c{i}"),
                name: format!("Customer {i}"),
                email: format!("c{i}@example.com"),
                phone: "0123456789".into(),
                address: String::new(),
                created_at: DateTime::from_timestamp(1_700_000_000 + i as i64, 0),
            })
            .collect()
    }

    #[test]
    fn load_more_grows_the_window_until_exhausted() {
        let mut lm: ListManager<Customer> = ListManager::with_page_size(9);
        lm.set_items(seed(20));
        assert_eq!(lm.visible().len(), 9);
        assert!(lm.has_more());
        lm.load_more();
        assert_eq!(lm.visible().len(), 18);
        lm.load_more();
        assert_eq!(lm.visible().len(), 20);
        assert!(!lm.has_more());
    }

    #[test]
    fn search_suspends_pagination_and_clearing_restores_it() {
        let mut lm: ListManager<Customer> = ListManager::with_page_size(9);
        lm.set_items(seed(20));
        let t0 = Instant::now();
        lm.set_query_input("customer 1".into(), t0);
        assert!(lm.tick(t0 + Duration::from_millis(350)));
        // "Customer 1" and "Customer 10".."Customer 19": 11 matches, all shown
        assert_eq!(lm.visible().len(), 11);
        assert!(!lm.has_more());
        lm.clear_query();
        assert_eq!(lm.visible().len(), 9);
    }

    #[test]
    fn records_without_timestamps_sort_after_timestamped_ones() {
        let mut lm: ListManager<Customer> = ListManager::with_page_size(9);
        let mut items = seed(2); // c0 older, c1 newer
        items.push(Customer {
            customer_id: "legacy".into(),
            name: "Legacy".into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            created_at: None,
        });
        lm.set_items(items);
        let ids: Vec<&str> = lm.items().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["c1", "c0", "legacy"]);
    }

    #[test]
    fn toggling_the_same_row_twice_clears_the_selection() {
        let mut lm: ListManager<Customer> = ListManager::with_page_size(9);
        lm.set_items(seed(3));
        let id = lm.cursor_record().unwrap().id().to_string();
        lm.toggle_select(&id);
        assert_eq!(lm.selected_id(), Some(id.as_str()));
        lm.toggle_select(&id);
        assert_eq!(lm.selected_id(), None);
    }

    #[test]
    fn saving_splices_by_id_without_duplicating() {
        let mut lm: ListManager<Customer> = ListManager::with_page_size(9);
        lm.set_items(seed(5));
        let total = lm.len();
        let mut edited = lm.items()[2].clone();
        edited.name = "Renamed".into();
        lm.apply_saved(edited);
        assert_eq!(lm.len(), total);
        assert!(lm.items().iter().any(|c| c.name == "Renamed"));
    }
}

mod import_report_tests {
    use backdesk::api::FailureEntry;
    use backdesk::import::{build_candidates, parse_sheet, ImportOutcome, ImportSeverity};
    use backdesk::model::Customer;

    #[test]
    fn pipeline_partitions_rows_into_candidates_and_skips() {
        let sheet = "Customer Name,Email Address,Phone\n\
                     Alice,a@example.com,0123456789\n\
                     ,b@example.com,0123456789\n\
                     Carol,c@example.com,\n";
        let batch = build_candidates::<Customer>(&parse_sheet(sheet));
        assert_eq!(batch.candidates.len(), 2); // phone is not hard-required
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].line, 3);
    }

    #[test]
    fn mixed_outcome_reports_partial_success() {
        let sheet = "name,email\nAlice,a@example.com\nBob,b@example.com\n";
        let batch = build_candidates::<Customer>(&parse_sheet(sheet));
        // pretend the server accepted one and rejected one
        let outcome = ImportOutcome {
            successful: vec![batch.candidates[0].clone()],
            failed: vec![FailureEntry {
                record: serde_json::json!({"name": "Bob"}),
                reason: "email already in use".into(),
            }],
            skipped: batch.skipped,
        };
        assert_eq!(outcome.severity(), ImportSeverity::PartialSuccess);
        assert!(outcome.has_failures());
        let report = outcome.failure_report_csv();
        assert!(report.starts_with("source,detail,reason\n"));
        assert!(report.contains("server,Bob,email already in use"));
    }
}
