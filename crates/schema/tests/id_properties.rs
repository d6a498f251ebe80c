//! Property tests: ids stay unique across arbitrary add/delete/move sequences.

use std::collections::HashSet;

use pdt_schema::{starter_catalog, Catalog, FieldType, ProductDraft};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    CreateProduct,
    AddSection(usize),
    AddField(usize, usize),
    DeleteSection(usize, usize),
    DeleteField(usize),
    MoveField(usize, usize, usize),
    DeleteProduct(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::CreateProduct),
        any::<usize>().prop_map(Op::AddSection),
        (any::<usize>(), any::<usize>()).prop_map(|(p, s)| Op::AddField(p, s)),
        (any::<usize>(), any::<usize>()).prop_map(|(p, s)| Op::DeleteSection(p, s)),
        any::<usize>().prop_map(Op::DeleteField),
        (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(p, f, s)| Op::MoveField(p, f, s)),
        any::<usize>().prop_map(Op::DeleteProduct),
    ]
}

fn apply(catalog: &mut Catalog, op: Op) {
    let products = catalog.products().to_vec();
    let pick_product = |n: usize| products.get(n % products.len().max(1)).cloned();
    match op {
        Op::CreateProduct => {
            catalog.create_product(ProductDraft::default());
        }
        Op::AddSection(p) => {
            if let Some(product) = pick_product(p) {
                catalog.add_section(&product.id);
            }
        }
        Op::AddField(p, s) => {
            if let Some(product) = pick_product(p) {
                if let Some(section) = product.sections.get(s % product.sections.len().max(1)) {
                    catalog.add_field(&product.id, &section.id, FieldType::text());
                }
            }
        }
        Op::DeleteSection(p, s) => {
            if let Some(product) = pick_product(p) {
                if let Some(section) = product.sections.get(s % product.sections.len().max(1)) {
                    catalog.delete_section(&section.id);
                }
            }
        }
        Op::DeleteField(f) => {
            let fields: Vec<_> = all_fields(catalog);
            if !fields.is_empty() {
                catalog.delete_field(&fields[f % fields.len()].clone().into());
            }
        }
        Op::MoveField(p, f, s) => {
            if let Some(product) = pick_product(p) {
                let fields: Vec<_> = product
                    .sections
                    .iter()
                    .flat_map(|section| section.fields.iter().map(|field| field.id.clone()))
                    .collect();
                if fields.is_empty() || product.sections.is_empty() {
                    return;
                }
                let field = &fields[f % fields.len()];
                let target = &product.sections[s % product.sections.len()];
                let anchor = target.fields.first().map(|field| field.id.clone());
                catalog.move_field(&product.id, field, &target.id, anchor.as_ref());
            }
        }
        Op::DeleteProduct(p) => {
            if let Some(product) = pick_product(p) {
                catalog.delete_product(&product.id);
            }
        }
    }
}

fn all_fields(catalog: &Catalog) -> Vec<String> {
    catalog
        .products()
        .iter()
        .flat_map(|product| product.sections.iter())
        .flat_map(|section| section.fields.iter())
        .map(|field| field.id.to_string())
        .collect()
}

fn assert_unique(catalog: &Catalog) {
    let mut products = HashSet::new();
    let mut sections = HashSet::new();
    let mut fields = HashSet::new();
    for product in catalog.products() {
        assert!(products.insert(product.id.clone()), "duplicate product id");
        for section in &product.sections {
            assert!(sections.insert(section.id.clone()), "duplicate section id");
            for field in &section.fields {
                assert!(fields.insert(field.id.clone()), "duplicate field id");
            }
        }
    }
}

proptest! {
    #[test]
    fn ids_remain_unique(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut catalog = starter_catalog();
        let mut seen_fields: HashSet<String> = all_fields(&catalog).into_iter().collect();
        for op in ops {
            let before: HashSet<String> = all_fields(&catalog).into_iter().collect();
            apply(&mut catalog, op);
            assert_unique(&catalog);
            // Fresh field ids never collide with any id issued earlier.
            for id in all_fields(&catalog) {
                if !before.contains(&id) {
                    prop_assert!(seen_fields.insert(id));
                }
            }
        }
    }

    #[test]
    fn moves_preserve_field_count(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut catalog = starter_catalog();
        for op in ops {
            let is_move = matches!(op, Op::MoveField(..));
            let count = all_fields(&catalog).len();
            apply(&mut catalog, op);
            if is_move {
                prop_assert_eq!(all_fields(&catalog).len(), count);
            }
        }
    }
}
