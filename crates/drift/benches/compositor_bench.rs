use criterion::{black_box, criterion_group, criterion_main, Criterion};
use drift::{
    BlendMode, Compositor, ConstantVelocity, DirectiveDefinition, Impulse, Locomotion,
    MotionConfig, MovementDirective, OwnerId, ScopeId,
};
use glam::Vec3;

fn populated_compositor(count: u64) -> Compositor {
    let mut compositor = Compositor::new(MotionConfig::default());
    for i in 0..count {
        let mode = match i % 3 {
            0 => BlendMode::Blend,
            1 => BlendMode::AllowOverride,
            _ => BlendMode::Additive,
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let priority = (i % 7) as i32;
        compositor.push(MovementDirective::new(
            OwnerId::new(i % 4),
            ScopeId::new(i),
            Box::new(
                ConstantVelocity::kinematic(Vec3::new(0.1, 0.0, 0.2))
                    .with_mode(mode)
                    .with_priority(priority)
                    .with_weight(0.3),
            ),
            DirectiveDefinition::new("bench"),
        ));
    }
    compositor.push(MovementDirective::new(
        OwnerId::new(99),
        ScopeId::new(0),
        Box::new(Impulse::new(Vec3::new(5.0, 0.0, 0.0), 0.1)),
        DirectiveDefinition::new("push"),
    ));
    compositor
}

fn bench_step_small(c: &mut Criterion) {
    let mut compositor = populated_compositor(4);
    let loco = Locomotion::moving(Vec3::Z, 4.0);
    c.bench_function("compositor_step_4", |b| {
        b.iter(|| black_box(compositor.step(black_box(&loco))))
    });
}

fn bench_step_large(c: &mut Criterion) {
    let mut compositor = populated_compositor(64);
    let loco = Locomotion::moving(Vec3::X, 4.0);
    c.bench_function("compositor_step_64", |b| {
        b.iter(|| black_box(compositor.step(black_box(&loco))))
    });
}

criterion_group!(benches, bench_step_small, bench_step_large);
criterion_main!(benches);
