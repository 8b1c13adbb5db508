use std::collections::BTreeMap;

use super::*;
use crate::model::measures::{FREQUENCY_ALIAS, SEVERITY_ALIAS};
use crate::model::thresholds::SupportProfile;
use crate::report::variants::ReportDefinition;

fn flagged(
    entity_type: EntityType,
    code: &str,
    measures: &[(&str, f64)],
    support: u64,
    is_outlier: bool,
) -> FlaggedRecord {
    FlaggedRecord {
        record: KpiRecord {
            entity_type,
            entity_code: code.to_string(),
            measures: measures
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            support,
        },
        is_outlier,
    }
}

fn severity_layout() -> ChartLayout {
    ReportDefinition::severity_volume(&SupportProfile::default_v1()).layout
}

fn frequency_layout() -> ChartLayout {
    ReportDefinition::frequency_severity(&SupportProfile::default_v1()).layout
}

#[test]
fn test_series_partition_and_annotations() {
    let input = vec![
        flagged(EntityType::Airport, "JFK", &[(SEVERITY_ALIAS, 5.0)], 6000, true),
        flagged(EntityType::Airport, "ORD", &[(SEVERITY_ALIAS, 50.0)], 6000, true),
        flagged(EntityType::Airline, "DL", &[(SEVERITY_ALIAS, 25.0)], 6000, false),
    ];
    let chart = run_stage3(&input, &severity_layout()).unwrap();

    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].label, "Airports");
    assert_eq!(chart.series[0].points, vec![(6000.0, 5.0), (6000.0, 50.0)]);
    assert_eq!(chart.series[1].label, "Airlines");
    assert_eq!(chart.series[1].points, vec![(6000.0, 25.0)]);
    assert!(chart.series.iter().all(|s| s.alpha == 0.6));

    let texts: Vec<&str> = chart.annotations.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, vec!["JFK", "ORD"]);
    assert_eq!(chart.annotations[0].at, (6000.0, 5.0));
    assert_eq!(chart.annotations[0].offset_px, (7, 7));
    assert!((chart.annotations[0].font_px - 8.0 * 100.0 / 72.0).abs() < 1e-9);
}

#[test]
fn test_median_lines_use_all_records() {
    let input = vec![
        flagged(
            EntityType::Airport,
            "A",
            &[(SEVERITY_ALIAS, 10.0), (FREQUENCY_ALIAS, 15.0)],
            6000,
            true,
        ),
        flagged(
            EntityType::Airport,
            "B",
            &[(SEVERITY_ALIAS, 20.0), (FREQUENCY_ALIAS, 25.0)],
            6000,
            false,
        ),
        flagged(
            EntityType::Airline,
            "C",
            &[(SEVERITY_ALIAS, 30.0), (FREQUENCY_ALIAS, 35.0)],
            6000,
            false,
        ),
        flagged(
            EntityType::Airline,
            "D",
            &[(SEVERITY_ALIAS, 60.0), (FREQUENCY_ALIAS, 45.0)],
            6000,
            true,
        ),
    ];
    let chart = run_stage3(&input, &frequency_layout()).unwrap();

    assert_eq!(
        chart.reference_lines,
        vec![
            ReferenceLine {
                axis: ReferenceAxis::X,
                value: 30.0
            },
            ReferenceLine {
                axis: ReferenceAxis::Y,
                value: 25.0
            },
        ]
    );
    assert_eq!(chart.annotations.len(), 2);
    assert_eq!(chart.annotations[0].offset_px, (6, 6));
}

#[test]
fn test_empty_input_renders_empty_chart() {
    let chart = run_stage3(&[], &severity_layout()).unwrap();
    assert_eq!(chart.series.len(), 2);
    assert!(chart.series.iter().all(|s| s.points.is_empty()));
    assert!(chart.annotations.is_empty());
    assert!(chart.reference_lines.is_empty());
    assert_eq!(chart.x_range, (1.0, 10.0));
    assert_eq!(chart.y_range, (0.0, 1.0));
    assert_eq!(chart.title, "Structural Delay Severity vs Flight Volume");
}

#[test]
fn test_log_scale_rejects_non_positive_x() {
    let input = vec![
        flagged(EntityType::Airport, "A", &[(SEVERITY_ALIAS, 10.0)], 6000, false),
        flagged(EntityType::Airport, "Z", &[(SEVERITY_ALIAS, 12.0)], 0, true),
    ];
    match run_stage3(&input, &severity_layout()) {
        Err(KpiError::InvalidScale { axis, value }) => {
            assert_eq!(axis, "x");
            assert_eq!(value, 0.0);
        }
        other => panic!("expected invalid scale, got {other:?}"),
    }
}

#[test]
fn test_linear_scale_accepts_negative_x() {
    let mut layout = frequency_layout();
    layout.reference_lines.clear();
    let input = vec![flagged(
        EntityType::Airline,
        "AA",
        &[(SEVERITY_ALIAS, -2.0), (FREQUENCY_ALIAS, -5.0)],
        6000,
        true,
    )];
    let chart = run_stage3(&input, &layout).unwrap();
    assert_eq!(chart.series[1].points, vec![(-5.0, -2.0)]);
}

#[test]
fn test_missing_plot_measure_is_reported() {
    let input = vec![flagged(
        EntityType::Airport,
        "A",
        &[(SEVERITY_ALIAS, 10.0)],
        6000,
        false,
    )];
    let err = run_stage3(&input, &frequency_layout()).unwrap_err();
    assert!(matches!(err, KpiError::MissingMeasure { .. }));
}

#[test]
fn test_axis_ranges() {
    assert_eq!(axis_range(&[], AxisScale::Linear), (0.0, 1.0));
    assert_eq!(axis_range(&[0.0, 10.0], AxisScale::Linear), (-0.5, 10.5));
    assert_eq!(axis_range(&[4.0], AxisScale::Linear), (3.0, 5.0));
    assert_eq!(axis_range(&[100.0], AxisScale::Log), (10.0, 1000.0));

    let (lo, hi) = axis_range(&[1000.0, 50000.0], AxisScale::Log);
    assert!((lo - 800.0).abs() < 1e-9);
    assert!((hi - 62500.0).abs() < 1e-9);
}

#[test]
fn test_points_to_px() {
    assert!((points_to_px(72.0) - 100.0).abs() < 1e-12);
}
