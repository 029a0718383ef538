//! Performance benchmarks for the attendance report engine.
//!
//! - Duration of a single punch pair
//! - Normalizing a month of attendance for many employees
//! - Building the worksheet for rosters of increasing size
//! - Rendering a built worksheet to xlsx bytes
//! - The `/attendance` preview endpoint end to end
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use attendance_report::aggregation::MemoryStore;
use attendance_report::api::{AppState, create_router};
use attendance_report::calculation::{calculate_work_duration, format_attendance_times};
use attendance_report::config::ConfigLoader;
use attendance_report::models::{
    AttendanceRecord, DayEntry, Employee, Project, ReportPeriod, ShiftPolicy,
};
use attendance_report::report::{ExportContext, ReportBuilder, Template, render_workbook};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const TEMPLATE: &str = "./config/templates/attendance.yaml";

fn march() -> ReportPeriod {
    ReportPeriod::new(
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    )
    .unwrap()
}

/// One record per employee with a punch pair on every weekday of March 2025.
fn create_records(employee_count: u64) -> Vec<AttendanceRecord> {
    let period = march();
    (1..=employee_count)
        .map(|id| {
            let policy = if id % 2 == 0 {
                ShiftPolicy::ShortLunch
            } else {
                ShiftPolicy::Standard
            };
            let days = period
                .dates()
                .into_iter()
                .filter(|d| !attendance_report::calculation::is_weekend(*d))
                .map(|date| {
                    let start = format!("08:{:02}:00", (id % 50) + 5);
                    let end = "17:45:00".to_string();
                    let worked_minutes =
                        calculate_work_duration(Some(&start), Some(&end), policy).unwrap();
                    DayEntry {
                        date,
                        start_time: Some(start),
                        end_time: Some(end),
                        worked_minutes,
                        display_start: None,
                        display_end: None,
                        tickets: vec![],
                    }
                })
                .collect();
            AttendanceRecord {
                employee: Employee {
                    id,
                    name: format!("Employee {}", id),
                    username: format!("emp{}", id),
                    shift_policy: policy,
                },
                days,
            }
        })
        .collect()
}

fn create_projects(employee_count: u64) -> Vec<Project> {
    (0u32..4)
        .map(|p| Project {
            id: p + 1,
            name: format!("Project {}", p + 1),
            employee_ids: (1..=employee_count).filter(|id| id % 4 == u64::from(p)).collect(),
        })
        .collect()
}

/// Benchmark: worked duration of one punch pair.
fn bench_work_duration(c: &mut Criterion) {
    c.bench_function("work_duration", |b| {
        b.iter(|| {
            calculate_work_duration(
                black_box(Some("08:07:31")),
                black_box(Some("17:52:10")),
                ShiftPolicy::Standard,
            )
        })
    });
}

/// Benchmark: normalizing display times for 100 employees.
fn bench_normalize(c: &mut Criterion) {
    let records = create_records(100);

    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(100));
    group.bench_function("month_100_employees", |b| {
        b.iter(|| format_attendance_times(black_box(&records)).unwrap())
    });
    group.finish();
}

/// Benchmark: building the worksheet for growing rosters.
fn bench_build_report(c: &mut Criterion) {
    let template = Template::load(TEMPLATE).expect("Failed to load template");

    let mut group = c.benchmark_group("build_report");
    for employees in [10u64, 50, 200] {
        let records = format_attendance_times(&create_records(employees)).unwrap();
        let context = ExportContext::new(march(), records, create_projects(employees));

        group.throughput(Throughput::Elements(employees));
        group.bench_with_input(
            BenchmarkId::from_parameter(employees),
            &context,
            |b, context| {
                b.iter(|| {
                    ReportBuilder::new(template.clone(), context)
                        .unwrap()
                        .build()
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

/// Benchmark: rendering a 50 employee worksheet to bytes.
fn bench_render(c: &mut Criterion) {
    let template = Template::load(TEMPLATE).expect("Failed to load template");
    let records = format_attendance_times(&create_records(50)).unwrap();
    let context = ExportContext::new(march(), records, create_projects(50));
    let sheet = ReportBuilder::new(template, &context).unwrap().build().unwrap();

    c.bench_function("render_50_employees", |b| {
        b.iter(|| {
            let mut workbook = render_workbook(black_box(&sheet)).unwrap();
            workbook.save_to_buffer().unwrap()
        })
    });
}

/// Benchmark: the preview endpoint over the demo store.
fn bench_preview_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    let store = MemoryStore::load(config.data_path().expect("demo data configured"))
        .expect("Failed to load demo store");
    let router = create_router(AppState::new(config, Arc::new(store)));
    let body = serde_json::json!({
        "employee_ids": [1, 2, 3],
        "start_date": "2025-03-01",
        "end_date": "2025-03-31"
    })
    .to_string();

    c.bench_function("preview_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/attendance")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_work_duration,
    bench_normalize,
    bench_build_report,
    bench_render,
    bench_preview_endpoint
);
criterion_main!(benches);
