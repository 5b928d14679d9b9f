use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mlx90614::pec::{read_word_pec, write_word_pec};
use mlx90614::{ConfigRegister, Register, TemperatureUnit, DEFAULT_ADDRESS};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("PEC");
    group.bench_function("Read word", |b| {
        b.iter(|| read_word_pec(black_box(DEFAULT_ADDRESS), black_box(0x07), [0x93, 0x35]))
    });
    group.bench_function("Write word", |b| {
        b.iter(|| write_word_pec(black_box(DEFAULT_ADDRESS), black_box(0x24), [0xFF, 0x7F]))
    });
    group.finish();

    let mut group = c.benchmark_group("Temperature Conversion");
    let units = [
        ("Kelvin", TemperatureUnit::Kelvin),
        ("Celsius", TemperatureUnit::Celsius),
        ("Fahrenheit", TemperatureUnit::Fahrenheit),
    ];
    for (name, unit) in units.iter() {
        group.bench_with_input(format!("{} from linear", name), unit, |b, unit| {
            b.iter(|| unit.from_linear(black_box(13715)))
        });
        group.bench_with_input(format!("{} to linear", name), unit, |b, unit| {
            b.iter(|| unit.to_linear(black_box(36.6)))
        });
    }
    group.finish();

    c.bench_function("Config register merge", |b| {
        b.iter(|| ConfigRegister::from(black_box(0x6048u16)).merge_into(black_box(0x9FB4)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
