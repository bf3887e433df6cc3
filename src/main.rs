use minesweeper_engine::*;
use std::thread;
use std::time::Duration;

fn main() {
    // --- 1. Initialization ---
    let difficulty = Difficulty::beginner();
    let mut board = Board::from_difficulty(&difficulty, None);

    println!("--- Autonomous Minesweeper Bot ---");
    println!(
        "{} ({}), {} lives",
        difficulty.name, difficulty.description, difficulty.lives
    );
    println!("Strategy: flag and reveal everything deducible, guess otherwise.");

    let mut solver = AiSolver::new(&mut board);
    print_board(solver.board());
    thread::sleep(Duration::from_secs(1));

    // --- 2. Game Loop ---
    let mut step = 0;
    while solver.board().state() == GameState::Playing && step < 500 {
        step += 1;
        println!("\n--- Step #{} ---", step);

        if !solver.solve_step() {
            println!("Nothing left to do.");
            break;
        }
        print_board(solver.board());
        thread::sleep(Duration::from_millis(200));
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    let stats = solver.statistics();
    println!(
        "Moves: {} total, {} deduced, {} guessed ({:.0}% logical)",
        stats.total_moves,
        stats.logical_moves,
        stats.guess_moves,
        stats.success_rate * 100.0
    );

    match solver.board().state() {
        GameState::Won => println!(
            "Result: the bot won in {} seconds!",
            solver.board().game_time()
        ),
        GameState::Lost => println!("Result: the bot ran out of lives."),
        GameState::Playing => println!("Result: the game ended unexpectedly."),
    }
}

fn print_board(board: &Board) {
    // Print header
    print!("   ");
    for col in 0..board.cols() {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(board.cols()));

    // Print rows
    for row in 0..board.rows() {
        print!("{:^2}|", row);
        for col in 0..board.cols() {
            let display = match board.cell_display(Point::new(row, col)) {
                CellDisplay::Flagged => " F ".to_string(),
                CellDisplay::Hidden => " ■ ".to_string(),
                CellDisplay::Mine => " * ".to_string(),
                CellDisplay::Blank => " . ".to_string(),
                CellDisplay::Number(n) => format!(" {} ", n),
            };
            print!("{}", display);
        }
        println!();
    }
    println!(
        "Lives: {}/{}  Mines left: {}",
        board.current_lives(),
        board.max_lives(),
        board.remaining_mines()
    );
}
