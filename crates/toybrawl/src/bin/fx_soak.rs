//! # Effects Soak Run
//!
//! Drives the effects runtime headlessly through a scripted battle: card
//! slides, hit bursts, heals and explosions on a fixed 60 FPS timeline.
//! Prints frame statistics and pool counters at the end.
//!
//! Usage: `fx_soak [--frames N] [--config fx.toml] [--mobile] [--verbose]`

use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

use toybrawl::core::{Clock, ManualClock, Rgb, Vec3, TARGET_FRAME_MS};
use toybrawl::particles::HeadlessSurface;
use toybrawl::tween::{
    AnimatedNode, ChainStep, Easing, ElementProps, Field, SpringOptions, StyledElement,
    TweenOptions,
};
use toybrawl::{EffectsConfig, EffectsRuntime};

struct Args {
    frames: u64,
    config: Option<String>,
    mobile: bool,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        frames: 600,
        config: None,
        mobile: false,
        verbose: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().ok_or("--frames needs a value")?;
                args.frames = value
                    .parse()
                    .map_err(|_| format!("--frames: not a number: {value}"))?;
            }
            "--config" => args.config = Some(iter.next().ok_or("--config needs a path")?),
            "--mobile" => args.mobile = true,
            "--verbose" => args.verbose = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("fx_soak: {message}");
            eprintln!("usage: fx_soak [--frames N] [--config fx.toml] [--mobile] [--verbose]");
            return ExitCode::from(2);
        }
    };

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    let mut config = match args.config.as_deref().map(EffectsConfig::load) {
        None => EffectsConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if args.mobile {
        config.device.mobile = true;
    }

    let clock = ManualClock::new(0.0);
    let mut fx = EffectsRuntime::new(clock.clone(), HeadlessSurface::new(), &config);
    fx.resize(1280, 720);

    let card = Rc::new(RefCell::new(StyledElement::default()));
    let aura = Rc::new(RefCell::new(AnimatedNode::default()));
    let health_bar = Rc::new(RefCell::new(AnimatedNode::default()));
    let completed = Rc::new(RefCell::new(0_u32));

    tracing::info!("soak run: {} frames", args.frames);
    for frame in 0..args.frames {
        script(&mut fx, frame, &card, &aura, &health_bar, &completed);
        clock.advance(TARGET_FRAME_MS);
        fx.frame();
        fx.particles_mut().surface_mut().take_draws();
    }

    // let everything land
    let mut drain = 0;
    while fx.needs_frame() && drain < 600 {
        clock.advance(TARGET_FRAME_MS);
        fx.frame();
        drain += 1;
    }

    let pool = fx.particles().stats();
    println!("{}", fx.frame_stats());
    println!(
        "particles: {} emitted, {} dropped, {} expired, {} categories ({} slots)",
        pool.emitted, pool.dropped, pool.expired, pool.categories, pool.total_capacity
    );
    println!(
        "tweens completed: {}, card at {}",
        completed.borrow(),
        card.borrow().css_transform
    );
    println!(
        "surface: {} uploads, {} bytes, simulated {:.0} ms",
        fx.particles().surface().uploads(),
        fx.particles().surface().bytes_uploaded(),
        fx.clock().now_ms()
    );

    fx.shutdown();
    ExitCode::SUCCESS
}

/// One scripted beat every few frames.
fn script(
    fx: &mut EffectsRuntime<ManualClock, HeadlessSurface>,
    frame: u64,
    card: &Rc<RefCell<StyledElement>>,
    aura: &Rc<RefCell<AnimatedNode>>,
    health_bar: &Rc<RefCell<AnimatedNode>>,
    completed: &Rc<RefCell<u32>>,
) {
    #[allow(clippy::cast_precision_loss)]
    let lane = ((frame / 30) % 5) as f32 * 40.0 - 80.0;
    let at = Vec3::new(lane, 0.0, 0.0);

    match frame % 120 {
        0 => {
            let counter = Rc::clone(completed);
            fx.tweens_mut().animate_element(
                card,
                ElementProps::new()
                    .translate(lane, -20.0)
                    .scale(1.2)
                    .rotation(5.0)
                    .on_complete(move || *counter.borrow_mut() += 1),
            );
        }
        20 => {
            fx.particles_mut().create_hit(at, None);
            let counter = Rc::clone(completed);
            fx.tweens_mut().chain([
                ChainStep::new(
                    health_bar,
                    TweenOptions::new(120.0)
                        .to(Field::Progress, 0.6)
                        .easing(Easing::EaseOutCubic),
                ),
                ChainStep::new(
                    health_bar,
                    TweenOptions::new(400.0)
                        .to(Field::Progress, 0.55)
                        .easing(Easing::EaseOutBounce)
                        .on_complete(move || *counter.borrow_mut() += 1),
                ),
            ]);
        }
        45 => {
            fx.particles_mut().create_heal(at);
            fx.tweens_mut().spring(
                aura,
                SpringOptions::new()
                    .to(Field::Scale, 1.5)
                    .stiffness(400.0)
                    .damping(40.0),
            );
        }
        70 => {
            fx.particles_mut().create_explosion(at, None);
            let spawner = fx.spawner();
            let fade = Rc::clone(aura);
            fx.tweens_mut().schedule(
                aura,
                TweenOptions::new(200.0)
                    .to(Field::Opacity, 0.2)
                    .on_complete(move || {
                        spawner.schedule(&fade, TweenOptions::new(300.0).to(Field::Opacity, 1.0));
                    }),
            );
        }
        90 => {
            fx.particles_mut()
                .create_sparkle(at, Some(Rgb::from_hex(0x66ccff)));
            fx.tweens_mut()
                .animate_element(card, ElementProps::new().duration_ms(250.0));
        }
        _ => {}
    }
}
