use maze_host::{save_export, HostConfig, HostError, MazeSession, SessionSeeds};
use maze_core::{MoveReport, OutcomeKind, RngKind};
use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;
use std::time::Instant;

fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("🔍 Crazy Maze");
    println!("{}", "=".repeat(70));
    println!();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let config = HostConfig::from_env().unwrap_or_else(|e| fail("Error reading configuration", e));
    let command = &args[1];

    match command.as_str() {
        "generate" => {
            if args.len() < 3 {
                eprintln!("Usage: {} generate <rule_seed> [--rng mono|lcg] [output_file]", args[0]);
                process::exit(1);
            }
            let rule_seed = parse_rule_seed(&args[2]);

            // Parse optional --rng flag
            let mut rng = config.rng;
            let mut output_file_idx = 3;
            if args.len() > 3 && args[3] == "--rng" {
                if args.len() < 5 {
                    eprintln!("❌ Error: --rng requires a value (mono|lcg)");
                    process::exit(1);
                }
                rng = args[4].parse().unwrap_or_else(|e| {
                    eprintln!("❌ Error: {}", e);
                    process::exit(1);
                });
                output_file_idx = 5;
            }

            let output_file = args.get(output_file_idx).map(|s| s.as_str());
            generate_command(&config, SessionSeeds::new(rule_seed, 0), rng, output_file);
        }

        "play" | "solve" => {
            if args.len() < 3 {
                eprintln!("Usage: {} {} <rule_seed> [placement_seed]", args[0], command);
                process::exit(1);
            }
            let seeds = SessionSeeds::new(parse_rule_seed(&args[2]), parse_placement_seed(args.get(3)));
            let session = start_session(&config, seeds, config.rng);

            if command == "play" {
                play_command(session);
            } else {
                solve_command(session, &config);
            }
        }

        "path" => {
            if args.len() < 5 {
                eprintln!("Usage: {} path <rule_seed> <from_label> <to_label>", args[0]);
                process::exit(1);
            }
            let seeds = SessionSeeds::new(parse_rule_seed(&args[2]), 0);
            let session = start_session(&config, seeds, config.rng);
            path_command(&session, &args[3], &args[4]);
        }

        _ => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate <rule_seed> [--rng mono|lcg] [output_file]");
    eprintln!("      Generate a maze and save its layout");
    eprintln!("      - rule_seed: Integer seed; same seed, same maze");
    eprintln!("      - --rng: Optional generator (mono|lcg), default from MAZE_RNG or mono");
    eprintln!("      - output_file: Optional JSON file, defaults to <rule_seed>_maze.json");
    eprintln!();
    eprintln!("  play <rule_seed> [placement_seed]");
    eprintln!("      Play interactively; commands are read from stdin");
    eprintln!("      - move <digits>: first digit is an arrow, the rest count clockwise");
    eprintln!("      - bridge, reset, solve, quit");
    eprintln!();
    eprintln!("  solve <rule_seed> [placement_seed]");
    eprintln!("      Walk the shortest path to the goal (MAZE_SOLVE_DELAY_MS per step)");
    eprintln!();
    eprintln!("  path <rule_seed> <from_label> <to_label>");
    eprintln!("      Print the controls of the shortest path between two cells");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MAZE_GRAPH_PATH, MAZE_RNG, MAZE_SOLVE_DELAY_MS");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  {} play 1 42", program);
}

fn fail(context: &str, err: HostError) -> ! {
    eprintln!();
    eprintln!("❌ {}: {}", context, err);
    eprintln!("{}", "=".repeat(70));
    process::exit(1);
}

fn parse_rule_seed(arg: &str) -> i32 {
    arg.parse().unwrap_or_else(|_| {
        eprintln!("❌ Error: Invalid rule seed '{}'. Must be an integer.", arg);
        process::exit(1);
    })
}

fn parse_placement_seed(arg: Option<&String>) -> u32 {
    match arg {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            eprintln!("❌ Error: Invalid placement seed '{}'. Must be a positive integer.", arg);
            process::exit(1);
        }),
        None => 0,
    }
}

fn start_session(config: &HostConfig, seeds: SessionSeeds, rng: RngKind) -> MazeSession {
    let graph = config.load_graph().unwrap_or_else(|e| fail("Error loading cell graph", e));
    MazeSession::start(Arc::new(graph), seeds, rng, 1).unwrap_or_else(|e| fail("Error generating maze", e))
}

fn generate_command(config: &HostConfig, seeds: SessionSeeds, rng: RngKind, output_file: Option<&str>) {
    println!("📋 Generating maze");
    println!("  Rule seed: {}", seeds.rule_seed);
    println!("  Generator: {}", rng);
    println!();

    let started = Instant::now();
    let session = start_session(config, seeds, rng);
    let export = session.export();
    println!("  Generation time: {:.3}s", started.elapsed().as_secs_f64());
    println!();
    println!("✅ Maze generated successfully!");
    println!("  Cells: {}", export.labels.len());
    println!("  Passages: {}", export.edges.len());
    println!("  Start: {}  Goal: {}", export.start, export.goal);
    println!();

    let default_filename = format!("{}_maze.json", seeds.rule_seed);
    let file_to_save = output_file.unwrap_or(&default_filename);
    match save_export(&export, file_to_save) {
        Ok(()) => println!("💾 Maze saved to: {}", file_to_save),
        Err(e) => fail("Error saving maze", e),
    }
    println!("{}", "=".repeat(70));
}

fn play_command(mut session: MazeSession) {
    print_status(&session);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => fail("Error reading input", e.into()),
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "solve" => session.auto_solve(std::time::Duration::ZERO),
            _ => session.run_command(line),
        };
        match result {
            Ok(reports) => print_reports(&session, &reports),
            Err(e) => {
                if let HostError::Command(failure) = &e {
                    print_reports(&session, &failure.reports);
                }
                println!("❌ {}", e);
            }
        }

        print_status(&session);
        if session.is_solved() {
            println!("🎊 Maze solved with {} strike(s)!", session.strikes());
            break;
        }
    }
}

fn solve_command(mut session: MazeSession, config: &HostConfig) {
    let controls = session.solution();
    println!("📋 Solving maze");
    println!("  Moves: {}", controls.len());
    println!("  Delay: {}ms per move", config.solve_delay.as_millis());
    println!();

    match session.auto_solve(config.solve_delay) {
        Ok(reports) => {
            print_reports(&session, &reports);
            println!();
            if session.is_solved() {
                println!("✅ Goal reached in {} moves", reports.len());
            } else {
                println!("❌ Goal not reached");
            }
            println!("{}", "=".repeat(70));
        }
        Err(e) => fail("Error solving maze", e),
    }
}

fn path_command(session: &MazeSession, from: &str, to: &str) {
    match session.path_between(from, to) {
        Ok(controls) if controls.is_empty() && !from.eq_ignore_ascii_case(to) => {
            println!("❌ No path from {} to {}", from, to);
        }
        Ok(controls) => {
            println!("🗺️  Path from {} to {} ({} moves):", from, to, controls.len());
            let names: Vec<String> = controls.iter().map(|c| c.to_string()).collect();
            println!("  {}", names.join(", "));
        }
        Err(e) => fail("Error finding path", e),
    }
}

fn print_status(session: &MazeSession) {
    let view = session.view();
    let bridge = if view.has_bridge { " + bridge" } else { "" };
    println!(
        "📍 Current: {}  Goal: {}  Arrows: {}{}  Strikes: {}",
        view.current_label, view.goal_label, view.arrows, bridge, view.strikes
    );
}

fn print_reports(session: &MazeSession, reports: &[MoveReport]) {
    for report in reports {
        let target = report.target.map(|cell| session.name(cell)).unwrap_or_default();
        let line = match report.kind {
            OutcomeKind::Moved => format!("  ➡️  {} → {}", report.control, target),
            OutcomeKind::Reached => format!("  🏁 {} → {}", report.control, target),
            OutcomeKind::Blocked => format!("  🧱 {} → {} is walled off (strike)", report.control, target),
            OutcomeKind::InvalidControl => format!("  ⚠️  there is no {} here", report.control),
        };
        println!("{}", line);
    }
}
