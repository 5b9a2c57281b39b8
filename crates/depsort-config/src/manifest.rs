//! Declarative item manifests.
//!
//! A manifest lists items by name. References between them are always named
//! (`"Model.Base"`, `"?Optional"`), so every item of a manifest is seeded and
//! the engine binds the names once all of them are known.

use crate::settings::SorterSettings;
use crate::ConfigResult;
use depsort_core::{
    DepSortError, DependentItem, DependentItemGroup, ItemHandle, ItemKind, ItemRef, NamedRef,
    TypedKind,
};
use depsort_resolver::{order_items, SorterResult};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

/// Static shape of a manifest item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    #[default]
    Item,
    Group,
    Container,
}

impl ManifestKind {
    /// Check if this kind accepts children
    pub fn has_children(&self) -> bool {
        !matches!(self, ManifestKind::Item)
    }
}

/// One `[[item]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemSpec {
    pub name: String,

    #[serde(default)]
    pub kind: ManifestKind,

    /// Kind decided at sort time, overrides `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typed: Option<ItemKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generalization: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    #[serde(default, alias = "required-by", skip_serializing_if = "Vec::is_empty")]
    pub required_by: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl ItemSpec {
    /// Create an item spec without relations
    pub fn new(name: impl Into<String>, kind: ManifestKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_generalization(mut self, generalization: impl Into<String>) -> Self {
        self.generalization = Some(generalization.into());
        self
    }

    /// Add a requirement
    pub fn requiring(mut self, name: impl Into<String>) -> Self {
        self.requires.push(name.into());
        self
    }

    /// Add an item that requires this one
    pub fn required_by(mut self, name: impl Into<String>) -> Self {
        self.required_by.push(name.into());
        self
    }

    /// Add a group membership
    pub fn in_group(mut self, name: impl Into<String>) -> Self {
        self.groups.push(name.into());
        self
    }

    /// Add a child, groups and containers only
    pub fn with_child(mut self, name: impl Into<String>) -> Self {
        self.children.push(name.into());
        self
    }

    /// Every reference of the item with the field it comes from
    fn references(&self) -> impl Iterator<Item = (&'static str, &String)> {
        fn single<'a>(field: &'static str, value: &'a Option<String>) -> Vec<(&'static str, &'a String)> {
            value.as_ref().map(|v| (field, v)).into_iter().collect::<Vec<_>>()
        }
        fn many<'a>(field: &'static str, values: &'a Vec<String>) -> Vec<(&'static str, &'a String)> {
            values.iter().map(|v| (field, v)).collect::<Vec<_>>()
        }
        let mut all = single("container", &self.container);
        all.extend(single("generalization", &self.generalization));
        all.extend(many("requires", &self.requires));
        all.extend(many("required_by", &self.required_by));
        all.extend(many("groups", &self.groups));
        all.extend(many("children", &self.children));
        all.into_iter()
    }
}

/// A parsed manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub sorter: SorterSettings,

    #[serde(default, rename = "item")]
    pub items: Vec<ItemSpec>,
}

impl Manifest {
    /// Create a manifest with default settings
    pub fn new(items: Vec<ItemSpec>) -> Self {
        Self {
            sorter: SorterSettings::default(),
            items,
        }
    }

    /// Checks names, references and children placement
    pub fn validate(&self) -> ConfigResult<()> {
        for (index, spec) in self.items.iter().enumerate() {
            let name = spec.name.trim();
            if name.is_empty() || name != spec.name || name.starts_with('?') {
                return Err(DepSortError::InvalidName {
                    name: spec.name.clone(),
                    reason: format!(
                        "item[{index}] needs a name without surrounding spaces or a leading '?'"
                    ),
                });
            }
            for (field, reference) in spec.references() {
                NamedRef::parse(reference).map_err(|e| {
                    DepSortError::validation(format!("{}.{field}", spec.name), e.to_string())
                })?;
            }
            if !spec.children.is_empty() && !spec.kind.has_children() {
                return Err(DepSortError::validation(
                    format!("{}.children", spec.name),
                    "only groups and containers can have children",
                ));
            }
        }
        Ok(())
    }

    /// One handle per item, in manifest order
    pub fn item_handles(&self) -> Vec<ItemHandle> {
        self.items
            .iter()
            .map(|spec| Rc::new(ManifestItem::new(spec.clone())) as ItemHandle)
            .collect()
    }

    /// Sorts every item with the manifest settings
    pub fn order(&self) -> SorterResult {
        self.order_with(&self.sorter)
    }

    /// Sorts every item with the given settings
    pub fn order_with(&self, settings: &SorterSettings) -> SorterResult {
        debug!(items = self.items.len(), ?settings, "ordering manifest");
        let mut result = order_items(self.item_handles(), None, settings.to_options());
        settings.apply_to(&mut result);
        result
    }
}

/// Manifest entry seen as a dependent item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    spec: ItemSpec,
}

impl ManifestItem {
    /// Wrap a spec
    pub fn new(spec: ItemSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ItemSpec {
        &self.spec
    }
}

fn named(names: &[String]) -> Vec<ItemRef> {
    names.iter().map(ItemRef::named).collect()
}

impl DependentItem for ManifestItem {
    fn full_name(&self) -> &str {
        &self.spec.name
    }

    fn container(&self) -> Option<ItemRef> {
        self.spec.container.as_ref().map(ItemRef::named)
    }

    fn generalization(&self) -> Option<ItemRef> {
        self.spec.generalization.as_ref().map(ItemRef::named)
    }

    fn requires(&self) -> Vec<ItemRef> {
        named(&self.spec.requires)
    }

    fn required_by(&self) -> Vec<ItemRef> {
        named(&self.spec.required_by)
    }

    fn groups(&self) -> Vec<ItemRef> {
        named(&self.spec.groups)
    }

    fn as_group(&self) -> Option<&dyn DependentItemGroup> {
        if self.spec.kind.has_children() || self.spec.typed.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl DependentItemGroup for ManifestItem {
    fn children(&self) -> Vec<ItemRef> {
        named(&self.spec.children)
    }

    fn is_container(&self) -> bool {
        self.spec.kind == ManifestKind::Container
    }

    fn as_typed(&self) -> Option<&dyn TypedKind> {
        self.spec.typed.map(|_| self as &dyn TypedKind)
    }
}

impl TypedKind for ManifestItem {
    fn item_kind(&self) -> ItemKind {
        self.spec.typed.unwrap_or(ItemKind::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsort_core::{resolve_kind, StructureError};

    fn names(result: &SorterResult) -> Vec<String> {
        result
            .sorted_full_names()
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_manifest_items_resolve_their_kind() {
        let item = ManifestItem::new(ItemSpec::new("A", ManifestKind::Item));
        assert_eq!(resolve_kind(&item), ItemKind::Item);
        let group = ManifestItem::new(ItemSpec::new("G", ManifestKind::Group));
        assert_eq!(resolve_kind(&group), ItemKind::Group);
        let container = ManifestItem::new(ItemSpec::new("C", ManifestKind::Container));
        assert_eq!(resolve_kind(&container), ItemKind::Container);

        let mut spec = ItemSpec::new("T", ManifestKind::Container);
        spec.typed = Some(ItemKind::Unknown);
        assert_eq!(resolve_kind(&ManifestItem::new(spec)), ItemKind::Item);
    }

    #[test]
    fn test_references_are_named() {
        let spec = ItemSpec::new("ASpec", ManifestKind::Item)
            .with_container("Package")
            .with_generalization("A")
            .requiring("?Optional")
            .required_by("Late");
        let item = ManifestItem::new(spec);
        assert_eq!(item.container().map(|c| c.display_name()).as_deref(), Some("Package"));
        assert_eq!(item.generalization().map(|g| g.full_name().to_string()).as_deref(), Some("A"));
        let requires = item.requires();
        assert_eq!(requires.len(), 1);
        assert!(requires[0].is_optional());
        assert_eq!(requires[0].full_name(), "Optional");
        assert_eq!(item.required_by()[0].full_name(), "Late");
    }

    #[test]
    fn test_order_manifest() {
        let manifest = Manifest::new(vec![
            ItemSpec::new("App", ManifestKind::Item).requiring("Model"),
            ItemSpec::new("Package", ManifestKind::Container).with_child("Model"),
            ItemSpec::new("Model", ManifestKind::Item).requiring("Base"),
            ItemSpec::new("Base", ManifestKind::Item),
        ]);
        manifest.validate().unwrap();
        let result = manifest.order();
        assert!(result.is_complete());
        assert_eq!(names(&result), ["Base", "Package.Head", "Model", "App", "Package"]);
        let model = result.find("Model").expect("sorted model");
        assert_eq!(model.container().map(|c| c.full_name()), Some("Package"));
    }

    #[test]
    fn test_order_with_settings() {
        let mut manifest = Manifest::new(vec![
            ItemSpec::new("B", ManifestKind::Item),
            ItemSpec::new("A", ManifestKind::Item),
            ItemSpec::new("C", ManifestKind::Item).requiring("Missing"),
        ]);
        let result = manifest.order();
        assert!(!result.is_complete());
        assert_eq!(names(&result), ["A", "B", "C"]);

        manifest.sorter.reverse_name = true;
        manifest.sorter.consider_required_missing_as_structure_error = false;
        let result = manifest.order();
        assert!(result.is_complete());
        assert_eq!(names(&result), ["C", "B", "A"]);
        assert_eq!(
            result.item_issues()[0].structure_error(),
            StructureError::MISSING_DEPENDENCY
        );
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        for name in ["", " A", "?A"] {
            let manifest = Manifest::new(vec![ItemSpec::new(name, ManifestKind::Item)]);
            assert!(matches!(
                manifest.validate(),
                Err(DepSortError::InvalidName { .. })
            ));
        }

        let manifest = Manifest::new(vec![ItemSpec::new("A", ManifestKind::Item).requiring("?")]);
        match manifest.validate() {
            Err(DepSortError::ConfigValidation { field, .. }) => assert_eq!(field, "A.requires"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_children_on_items() {
        let manifest = Manifest::new(vec![ItemSpec::new("A", ManifestKind::Item).with_child("B")]);
        match manifest.validate() {
            Err(DepSortError::ConfigValidation { field, reason }) => {
                assert_eq!(field, "A.children");
                assert!(reason.contains("groups and containers"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut spec = ItemSpec::new("C", ManifestKind::Container).with_child("B");
        spec.typed = Some(ItemKind::Item);
        let manifest = Manifest::new(vec![spec, ItemSpec::new("B", ManifestKind::Item)]);
        assert!(manifest.validate().is_ok());
        let result = manifest.order();
        assert!(result.has_structure_error());
        assert!(!result.has_severe_structure_error());
    }
}
