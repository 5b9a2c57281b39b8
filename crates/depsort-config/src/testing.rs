//! Generated manifests for property tests.

use crate::manifest::{ItemSpec, Manifest, ManifestKind};
use crate::settings::SorterSettings;
use depsort_core::ItemKind;
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,6}(\\.[A-Z][a-z]{0,4})?"
}

/// A name, optional when prefixed by `?`
fn reference() -> impl Strategy<Value = String> {
    (any::<bool>(), name()).prop_map(|(optional, name)| {
        if optional {
            format!("?{name}")
        } else {
            name
        }
    })
}

fn manifest_kind() -> impl Strategy<Value = ManifestKind> {
    prop_oneof![
        Just(ManifestKind::Item),
        Just(ManifestKind::Group),
        Just(ManifestKind::Container),
    ]
}

fn item_kind() -> impl Strategy<Value = ItemKind> {
    prop_oneof![
        Just(ItemKind::Unknown),
        Just(ItemKind::Item),
        Just(ItemKind::Group),
        Just(ItemKind::Container),
    ]
}

fn item_spec() -> impl Strategy<Value = ItemSpec> {
    let references = || prop::collection::vec(reference(), 0..3);
    (
        (name(), manifest_kind(), prop::option::of(item_kind())),
        (prop::option::of(reference()), prop::option::of(reference())),
        (references(), references(), references(), references()),
    )
        .prop_map(
            |((name, kind, typed), (container, generalization), (requires, required_by, groups, children))| {
                ItemSpec {
                    name,
                    kind,
                    typed,
                    container,
                    generalization,
                    requires,
                    required_by,
                    groups,
                    children: if kind.has_children() { children } else { Vec::new() },
                }
            },
        )
}

/// Valid manifests with at least one item
pub(crate) fn manifest() -> impl Strategy<Value = Manifest> {
    (
        any::<(bool, bool, bool)>(),
        prop::collection::vec(item_spec(), 1..6),
    )
        .prop_map(|((reverse_name, skip, consider), items)| Manifest {
            sorter: SorterSettings {
                reverse_name,
                skip_dependency_to_container: skip,
                consider_required_missing_as_structure_error: consider,
            },
            items,
        })
}
