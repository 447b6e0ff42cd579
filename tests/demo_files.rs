use std::path::PathBuf;
use std::time::Instant;

use bubble_reflect::config::load_config;
use bubble_reflect::items::load_items;
use bubble_reflect::{BubbleChart, Category, ChartVariant, LayoutPhase};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn grouped_demo_loads_with_categories() {
    let items = load_items(&demo("items.json")).unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0].id, "anxious");
    assert_eq!(items[3].weight, 1.0);
    assert_eq!(items[4].category(), Category::Part);
    assert_eq!(items[7].category(), Category::Need);
}

#[test]
fn list_demo_keeps_explicit_ids() {
    let items = load_items(&demo("items-list.json")).unwrap();
    let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn demo_config_overrides_only_named_fields() {
    let config = load_config(&demo("config.json")).unwrap();
    assert_eq!(config.padding, 4.0);
    assert_eq!(config.max_ticks, 800);
    assert_eq!(config.fill_ratio, bubble_reflect::ChartConfig::default().fill_ratio);
}

#[test]
fn every_variant_settles_the_demo_set() {
    let items = load_items(&demo("items.json")).unwrap();
    for variant in ChartVariant::ALL {
        let mut chart = BubbleChart::new(variant.style());
        chart.set_viewport(360.0, 280.0);
        chart.set_items(items.clone());
        let snapshot = chart.run_to_settle(Instant::now()).unwrap();

        assert_eq!(chart.phase(), LayoutPhase::Settled, "{variant:?}");
        assert_eq!(snapshot.frames.len(), items.len());

        let padding = chart.config().padding;
        for (index, a) in snapshot.frames.iter().enumerate() {
            for b in &snapshot.frames[index + 1..] {
                let distance = a.center().distance(b.center());
                assert!(
                    distance >= a.radius + b.radius + padding - 1e-3,
                    "{variant:?}: {} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }
}
