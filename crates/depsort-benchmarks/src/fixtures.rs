//! Generated manifests of configurable size

use depsort_config::{ItemSpec, Manifest, ManifestKind};

/// `count` items where item `i` requires up to three earlier ones
pub fn layered_manifest(count: usize) -> Manifest {
    let items = (0..count)
        .map(|i| {
            let mut spec = ItemSpec::new(format!("Item.{i:05}"), ManifestKind::Item);
            for step in [1, 7, 31] {
                if i >= step {
                    spec = spec.requiring(format!("Item.{:05}", i - step));
                }
            }
            spec
        })
        .collect();
    Manifest::new(items)
}

/// `packages` containers of `per_package` items; each package requires the previous one
pub fn package_manifest(packages: usize, per_package: usize) -> Manifest {
    let mut items = Vec::with_capacity(packages * (per_package + 1));
    for p in 0..packages {
        let package = format!("Pkg{p:03}");
        let mut container = ItemSpec::new(package.clone(), ManifestKind::Container);
        if p > 0 {
            container = container.requiring(format!("Pkg{:03}", p - 1));
        }
        items.push(container);
        for i in 0..per_package {
            let mut spec = ItemSpec::new(format!("{package}.Item{i:03}"), ManifestKind::Item)
                .with_container(package.clone());
            if i > 0 {
                spec = spec.with_generalization(format!("{package}.Item{:03}", i - 1));
            }
            items.push(spec);
        }
    }
    Manifest::new(items)
}

/// `count` items requiring each other in a single ring
pub fn ring_manifest(count: usize) -> Manifest {
    let items = (0..count)
        .map(|i| {
            ItemSpec::new(format!("Ring.{i:05}"), ManifestKind::Item)
                .requiring(format!("Ring.{:05}", (i + 1) % count))
        })
        .collect();
    Manifest::new(items)
}
