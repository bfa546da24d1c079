//! Dream Dash entry point
//!
//! On the web the exported `WebGame` is driven by the page. Natively this
//! runs a headless session with a simple autopilot and prints a summary:
//!
//! `dream-dash [variant|config.json] [seconds] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dream_dash::consts::FRAME_DT;
    use dream_dash::sim::GameEvent;
    use dream_dash::{Game, SimConfig};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let source = args.next().unwrap_or_else(|| "enhanced".to_string());
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x0D2E_A3D5);

    let config = load_config(&source).unwrap_or_else(|e| {
        log::error!("{e}; falling back to the default preset");
        SimConfig::default()
    });

    let mut game = Game::new(config, seed);
    let mut hits = 0;
    let mut gusts = 0;
    let frames = (seconds / FRAME_DT).ceil() as u64;

    for _ in 0..frames {
        let input = autopilot(&game);
        game.tick(FRAME_DT, &input);
        for event in game.events() {
            match event {
                GameEvent::HazardHit { .. } => hits += 1,
                GameEvent::GustStarted { .. } => gusts += 1,
                _ => {}
            }
        }
        if game.is_game_over() {
            break;
        }
    }

    println!(
        "{}: score {} | level {} | lives {} | hits {} | gusts {} | {:.1}s simulated",
        game.config().variant.as_str(),
        game.score(),
        game.level(),
        game.lives().map_or_else(|| "-".to_string(), |l| l.to_string()),
        hits,
        gusts,
        game.state().time,
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(source: &str) -> Result<dream_dash::SimConfig, Box<dyn std::error::Error>> {
    use dream_dash::{SimConfig, Variant};

    if source.ends_with(".json") {
        let json = std::fs::read_to_string(source)?;
        Ok(SimConfig::from_json(&json)?)
    } else {
        Ok(SimConfig::preset(source.parse::<Variant>()?))
    }
}

/// Jump over approaching storms, otherwise drift towards the nearest star
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(game: &dream_dash::Game) -> dream_dash::sim::TickInput {
    use dream_dash::config::ScrollAxis;
    use dream_dash::sim::TickInput;

    let player = game.player();
    let center = player.center();
    let axis = game.config().axis;
    let mut input = TickInput::default();

    // Distance still to travel before an entity reaches the player
    let approach = |pos: glam::Vec3| match axis {
        ScrollAxis::Lateral => pos.x - center.x,
        ScrollAxis::Depth => center.z - pos.z,
    };
    let lane_gap = |pos: glam::Vec3| match axis {
        ScrollAxis::Lateral => (pos.y - center.y).abs(),
        ScrollAxis::Depth => (pos.x - center.x).abs(),
    };

    let danger = game.storms().iter().filter(|s| s.active).any(|s| {
        let ahead = approach(s.pos);
        ahead > 0.0 && ahead < player.size * 4.0 && lane_gap(s.pos) < s.radius + player.size
    });
    // Jumps need a fresh press, so let go of Up for a tick after landing
    let can_press = !(player.grounded && player.up_held);
    if danger {
        input.up = can_press;
        return input;
    }

    let target = game
        .stars()
        .iter()
        .filter(|s| approach(s.pos) > 0.0)
        .min_by(|a, b| approach(a.pos).total_cmp(&approach(b.pos)));
    if let Some(star) = target {
        match axis {
            ScrollAxis::Lateral => {
                input.up = star.pos.y < center.y - player.size && player.grounded && can_press
            }
            ScrollAxis::Depth => {
                input.left = star.pos.x < center.x - player.size * 0.25;
                input.right = star.pos.x > center.x + player.size * 0.25;
                input.up = star.pos.y < center.y - player.size && approach(star.pos) < 6.0 && can_press;
            }
        }
    }
    input
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
