use std::time::Instant;

use recipe_path_core::{Algorithm, Recipe, SearchConfig, SearchEngine, BASE_ELEMENTS};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let element_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(400).max(2);

    if mode == "help" || mode == "--help" {
        println!("Usage: recipe-path-bench [mode] [element_count]");
        println!();
        println!("Modes:");
        println!("  all      Run all generators and benchmark each (default)");
        println!("  tiered   Layered relation, few producers per element (game-like)");
        println!("  chain    Long dependency chain (deep paths)");
        println!("  bushy    Many alternative producers per element");
        println!("  cyclic   Tiered relation plus mutually dependent islands");
        println!();
        println!("Default element_count: 400");
        return;
    }

    println!("recipe-path-bench");
    println!("=================");
    println!();

    let generators: Vec<(&str, fn(usize) -> Vec<Recipe>)> = match mode {
        "tiered" => vec![("Tiered", gen_tiered)],
        "chain" => vec![("Chain", gen_chain)],
        "bushy" => vec![("Bushy", gen_bushy)],
        "cyclic" => vec![("Cyclic islands", gen_cyclic)],
        "all" => vec![
            ("Tiered", gen_tiered as fn(usize) -> Vec<Recipe>),
            ("Chain", gen_chain),
            ("Bushy", gen_bushy),
            ("Cyclic islands", gen_cyclic),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, element_count);
    }
}

fn run_benchmark(name: &str, generator: fn(usize) -> Vec<Recipe>, element_count: usize) {
    println!("--- {} ---", name);
    println!("Target: {} elements", element_count);

    let t = Instant::now();
    let recipes = generator(element_count);
    let gen_time = t.elapsed();

    let engine = match SearchEngine::new(SearchConfig::default()) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };
    let graph = engine.build_graph(recipes);
    println!(
        "Generated in {:.1}ms: {} elements, {} recipes",
        gen_time.as_secs_f64() * 1000.0,
        graph.element_count(),
        graph.recipe_count()
    );

    // Last generated element is the deepest; the middle one is typical.
    let deepest = element_name(element_count - 1);
    let middle = element_name(element_count / 2);

    println!();
    println!(
        "{:>10} {:>6} {:>8} {:>10} {:>10}",
        "target", "algo", "steps", "visited", "time"
    );
    println!("{:->10} {:->6} {:->8} {:->10} {:->10}", "", "", "", "", "");

    for target in [&middle, &deepest] {
        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Bds] {
            engine.reset_caches();
            let t = Instant::now();
            let result = match algorithm {
                Algorithm::Bfs => engine.find_shortest_path(target),
                Algorithm::Dfs => engine.find_path(target),
                Algorithm::Bds => engine.find_meeting_path(target),
            };
            let elapsed = t.elapsed();
            match result {
                Ok(outcome) => println!(
                    "{:>10} {:>6} {:>8} {:>10} {:>8.2}ms",
                    target,
                    algorithm,
                    outcome.path.len(),
                    outcome.nodes_visited,
                    elapsed.as_secs_f64() * 1000.0
                ),
                Err(err) => println!(
                    "{:>10} {:>6} {:>8} {:>10} {:>8.2}ms",
                    target,
                    algorithm,
                    "-",
                    err.nodes_visited(),
                    elapsed.as_secs_f64() * 1000.0
                ),
            }
        }
    }

    // Multi-path: 5 distinct paths to the deepest element
    println!();
    for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Bds] {
        engine.reset_caches();
        let t = Instant::now();
        let result = engine.find_multiple_paths(&deepest, 5, algorithm);
        let elapsed = t.elapsed();
        match result {
            Ok(found) => println!(
                "Multi-path {} → {}: {} paths, {} visited in {:.1}ms",
                algorithm,
                deepest,
                found.paths.len(),
                found.nodes_visited,
                elapsed.as_secs_f64() * 1000.0
            ),
            Err(err) => println!(
                "Multi-path {} → {}: {} ({:.1}ms)",
                algorithm,
                deepest,
                err,
                elapsed.as_secs_f64() * 1000.0
            ),
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: deterministic, single-threaded. Element i is named "E{i}" and
// is only ever produced from base elements or elements with a smaller index,
// except for the deliberate islands in gen_cyclic.
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
}

fn element_name(index: usize) -> String {
    format!("E{}", index)
}

/// Pick an ingredient among the base elements and elements `0..upper`.
fn pick(rng: &mut FastRng, upper: usize) -> String {
    let choice = rng.next((upper + BASE_ELEMENTS.len()) as u64) as usize;
    if choice < BASE_ELEMENTS.len() {
        BASE_ELEMENTS[choice].to_string()
    } else {
        element_name(choice - BASE_ELEMENTS.len())
    }
}

/// Layered relation shaped like a crafting game.
///
/// Elements are grouped into tiers of 20; each gets 1-3 recipes whose
/// ingredients come from the tiers below it.
fn gen_tiered(element_count: usize) -> Vec<Recipe> {
    let mut rng = FastRng::new(42);
    let tier = 20usize;
    let mut recipes = Vec::with_capacity(element_count * 2);

    for i in 0..element_count {
        let below = (i / tier) * tier;
        let upper = below.max(1).min(i);
        let producers = 1 + rng.next(3) as usize;
        for _ in 0..producers {
            let a = pick(&mut rng, upper);
            let b = pick(&mut rng, upper);
            recipes.push(Recipe::new(a, b, element_name(i)));
        }
    }
    recipes
}

/// Each element needs its predecessor plus a base element: path length
/// grows linearly with the index.
fn gen_chain(element_count: usize) -> Vec<Recipe> {
    let mut rng = FastRng::new(12345);
    let mut recipes = Vec::with_capacity(element_count);

    for i in 0..element_count {
        let base = BASE_ELEMENTS[rng.next(BASE_ELEMENTS.len() as u64) as usize];
        let previous = if i == 0 {
            BASE_ELEMENTS[0].to_string()
        } else {
            element_name(i - 1)
        };
        recipes.push(Recipe::new(previous, base, element_name(i)));
    }
    recipes
}

/// Every element has 6 producers drawn from anything before it. Stresses
/// recipe ranking and the multi-path variants.
fn gen_bushy(element_count: usize) -> Vec<Recipe> {
    let mut rng = FastRng::new(67890);
    let mut recipes = Vec::with_capacity(element_count * 6);

    for i in 0..element_count {
        for _ in 0..6 {
            let a = pick(&mut rng, i);
            let b = pick(&mut rng, i);
            recipes.push(Recipe::new(a, b, element_name(i)));
        }
    }
    recipes
}

/// Tiered relation plus pairs of elements that only produce each other.
/// One in ten regular elements also has a recipe through an island, which
/// every search must see past.
fn gen_cyclic(element_count: usize) -> Vec<Recipe> {
    let mut rng = FastRng::new(99999);
    let mut recipes = gen_tiered(element_count);
    let islands = (element_count / 10).max(1);

    for k in 0..islands {
        let left = format!("Island{}A", k);
        let right = format!("Island{}B", k);
        recipes.push(Recipe::new(right.clone(), pick(&mut rng, 0), left.clone()));
        recipes.push(Recipe::new(left.clone(), pick(&mut rng, 0), right));

        let victim = rng.next(element_count as u64) as usize;
        recipes.push(Recipe::new(left, pick(&mut rng, victim), element_name(victim)));
    }
    recipes
}
