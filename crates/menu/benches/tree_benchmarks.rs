use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use guardian_menu::{MenuConfig, RawOption, audit, build_tree};

const PARENTS: &[&str] = &[
    "Gestión de Secciones",
    "Gestión de Roles",
    "Vehículos",
    "Reportes",
    "Auditoría",
];

/// `n` items spread over a handful of menus, with some misspelled parents.
fn options(n: usize) -> Vec<RawOption> {
    let mut out: Vec<RawOption> = PARENTS.iter().map(|p| RawOption::menu(*p)).collect();
    for i in 0..n {
        let parent = PARENTS[i % PARENTS.len()];
        let parent = if i % 7 == 0 {
            parent.replacen('e', "", 1)
        } else {
            parent.to_string()
        };
        let verb = ["Crear", "Listar", "Editar", "Ver"][i % 4];
        out.push(RawOption::item(
            format!("{verb} Registro {i}"),
            Some(parent.as_str()),
            Some(format!("/modulo/{i}/{}", verb.to_lowercase()).as_str()),
        ));
    }
    out
}

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");
    let canonical = MenuConfig::default();
    let literal = MenuConfig {
        keep_literal_paths: true,
        ..MenuConfig::default()
    };

    for n in [50usize, 200, 1_000] {
        let raw = options(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("canonical", n), &raw, |b, raw| {
            b.iter(|| black_box(build_tree(black_box(raw), &canonical, Some("5"))));
        });

        group.bench_with_input(BenchmarkId::new("literal", n), &raw, |b, raw| {
            b.iter(|| black_box(build_tree(black_box(raw), &literal, None)));
        });
    }

    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("audit");
    let config = MenuConfig::default();

    for n in [50usize, 200] {
        let raw = options(n);
        let tree = build_tree(&raw, &config, Some("5"));
        group.bench_with_input(BenchmarkId::from_parameter(n), &raw, |b, raw| {
            b.iter(|| black_box(audit(black_box(raw), &tree)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_tree, bench_audit);
criterion_main!(benches);
