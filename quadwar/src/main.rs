// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    fmt,
    io::{self, BufRead, Write},
    net::{TcpListener, TcpStream},
    thread,
    time::Duration,
};

use clap::{value_t, App, Arg, ArgMatches};
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;

use algebraicwar::{
    game::{Advance, MoveOutcome, SelectOutcome},
    net::{Channel, ChannelError, JsonLinesChannel, PeerEvent, Role},
    rules::{legal_moves, Phase},
    Controller, Game, GameResult, Move, Piece, Position, Side, TurnState,
};

fn main() -> io::Result<()> {
    env_logger::init();

    let matches = App::new("Quadwar")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Command line Algebraic War: line up terms to form quadratic equations.")
        .arg(
            Arg::with_name("mode")
                .short("m")
                .long("mode")
                .value_name("MODE")
                .help("play against the computer, another local player, or over the network")
                .takes_value(true)
                .possible_values(&["pvc", "pvp", "host", "join"])
                .case_insensitive(true),
        )
        .arg(
            Arg::with_name("side")
                .short("s")
                .long("side")
                .value_name("SIDE")
                .help("side the human plays against the computer; second moves first")
                .takes_value(true)
                .default_value("second")
                .possible_values(&["first", "second", "random", "rand"])
                .case_insensitive(true),
        )
        .arg(
            Arg::with_name("addr")
                .short("a")
                .long("addr")
                .value_name("HOST:PORT")
                .help("address to listen on when hosting or to connect to when joining")
                .takes_value(true)
                .default_value("127.0.0.1:7878"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("seed for the computer player")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ai_delay_ms")
                .long("ai-delay-ms")
                .value_name("MILLIS")
                .help("pause before the computer moves")
                .takes_value(true)
                .default_value("800"),
        )
        .arg(
            Arg::with_name("phase_ms")
                .long("phase-ms")
                .value_name("MILLIS")
                .help("how long each equation phase is shown")
                .takes_value(true)
                .default_value("1500"),
        )
        .get_matches();

    let pacing = Pacing::from_matches(&matches);
    let mut rng = if matches.is_present("seed") {
        StdRng::seed_from_u64(value_t!(matches, "seed", u64).unwrap_or_else(|e| e.exit()))
    } else {
        StdRng::from_entropy()
    };

    let stdin = io::stdin();
    let mut input = InputReader::new(stdin.lock());

    let mode = choose_mode(&matches, &mut input)?;
    let addr = matches.value_of("addr").unwrap_or("127.0.0.1:7878");
    let (game, peer) = match mode {
        Mode::Computer => {
            let human = choose_side(&matches, &mut rng);
            println!("You play {}.", SideName(human));
            let game = match human {
                Side::First => Game::new(Controller::Local, Controller::Computer),
                Side::Second => Game::new(Controller::Computer, Controller::Local),
            };
            (game, None)
        }
        Mode::Local => (Game::new(Controller::Local, Controller::Local), None),
        Mode::Host => {
            let listener = TcpListener::bind(addr)?;
            println!("Waiting for an opponent on {}...", listener.local_addr()?);
            let (stream, remote) = listener.accept()?;
            log::info!("accepted connection from {}", remote);
            connect(Role::Host, stream)?
        }
        Mode::Join => {
            println!("Connecting to {}...", addr);
            let stream = TcpStream::connect(addr)?;
            connect(Role::Joiner, stream)?
        }
    };

    Session {
        game,
        input,
        rng,
        pacing,
        peer,
    }
    .run()
}

/// Run the handshake on a new connection and set up the game for the local side.
fn connect(role: Role, stream: TcpStream) -> io::Result<(Game, Option<Peer>)> {
    let mut channel = JsonLinesChannel::from_stream(stream)?;
    let side = role.handshake(&mut channel).map_err(channel_io)?;
    println!("Connected. You play {}.", SideName(side));
    let game = match side {
        Side::First => Game::new(Controller::Local, Controller::Remote),
        Side::Second => Game::new(Controller::Remote, Controller::Local),
    };
    let peer = Peer {
        channel: Box::new(channel),
        role,
    };
    Ok((game, Some(peer)))
}

fn channel_io(err: ChannelError) -> io::Error {
    match err {
        ChannelError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

/// How the game is played.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Mode {
    Computer,
    Local,
    Host,
    Join,
}

/// Choose the [`Mode`] based on either args or cli input.
fn choose_mode<B: BufRead>(matches: &ArgMatches, input: &mut InputReader<B>) -> io::Result<Mode> {
    Ok(if let Some(clichoice) = matches.value_of("mode") {
        match clichoice.to_ascii_lowercase().as_str() {
            "pvc" => Mode::Computer,
            "pvp" => Mode::Local,
            "host" => Mode::Host,
            "join" => Mode::Join,
            _ => unreachable!(),
        }
    } else {
        input.read_input_lower(
            "Play the [c]omputer, a [l]ocal opponent, [h]ost or [j]oin a network game? (C/l/h/j)",
            |input| match input {
                "c" | "computer" | "pvc" | "" => Some(Mode::Computer),
                "l" | "local" | "pvp" => Some(Mode::Local),
                "h" | "host" => Some(Mode::Host),
                "j" | "join" => Some(Mode::Join),
                _ => {
                    println!("Invalid selection.");
                    None
                }
            },
        )?
    })
}

/// Choose which [`Side`] the human plays against the computer.
fn choose_side(matches: &ArgMatches, rng: &mut impl Rng) -> Side {
    match matches
        .value_of("side")
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("first") => Side::First,
        Some("random") | Some("rand") => rng.gen(),
        _ => Side::Second,
    }
}

/// Pauses that let a human follow the game.
#[derive(Debug, Copy, Clone)]
struct Pacing {
    /// Before the computer moves.
    ai_delay: Duration,
    /// For each phase of an equation.
    phase: Duration,
}

impl Pacing {
    fn from_matches(matches: &ArgMatches) -> Self {
        let millis = |name: &str| value_t!(matches, name, u64).unwrap_or_else(|e| e.exit());
        Self {
            ai_delay: Duration::from_millis(millis("ai_delay_ms")),
            phase: Duration::from_millis(millis("phase_ms")),
        }
    }
}

/// Connection to the other player in a network game.
struct Peer {
    channel: Box<dyn Channel>,
    role: Role,
}

/// Commands available on a local player's turn.
enum Command {
    Select(Position),
    Move(Move),
    Moves,
    Board,
    Pass,
    Restart,
    Help,
    Quit,
}

/// Parse a command typed by the player.
fn parse_command(input: &str) -> Option<Command> {
    /// Matcher for moves, with or without the command word.
    static MOVE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?x)(?:(?:move|mv|m)\s+)?
        (?P<fr>[0-9]+)\s*,\s*(?P<fc>[0-9]+)
        (?:\s*(?:->|=>|to)\s*|\s+)
        (?P<tr>[0-9]+)\s*,\s*(?P<tc>[0-9]+)$",
        )
        .unwrap()
    });
    static SELECT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?x)(?:(?:select|sel|s)\s+)?
        (?P<r>[0-9]+)\s*,\s*(?P<c>[0-9]+)$",
        )
        .unwrap()
    });

    match input {
        "?" | "help" | "h" => Some(Command::Help),
        "moves" | "list" => Some(Command::Moves),
        "board" | "show" => Some(Command::Board),
        "pass" => Some(Command::Pass),
        "restart" | "new" => Some(Command::Restart),
        "quit" | "exit" | "q" => Some(Command::Quit),
        other => {
            if let Some(captures) = MOVE.captures(other) {
                let from = parse_position(&captures["fr"], &captures["fc"])?;
                let to = parse_position(&captures["tr"], &captures["tc"])?;
                Some(Command::Move(Move::new(from, to)))
            } else if let Some(captures) = SELECT.captures(other) {
                let pos = parse_position(&captures["r"], &captures["c"])?;
                Some(Command::Select(pos))
            } else {
                println!("Invalid command \"{}\". Use '?' for help", other);
                None
            }
        }
    }
}

fn parse_position(row: &str, col: &str) -> Option<Position> {
    match (row.parse(), col.parse()) {
        (Ok(row), Ok(col)) => Some(Position::new(row, col)),
        _ => {
            println!("invalid position {},{}", row, col);
            None
        }
    }
}

const HELP: &str = "Available Commands:
    <r>,<c>                 select your piece at row r, column c, or move the selected
                            piece there if it is one of its destinations.
    select <r>,<c>          same as above.
    move <r>,<c> <r>,<c>    move a piece directly. Also written <r>,<c> -> <r>,<c>.
    moves                   list the moves available to the selection, or to every piece.
    board                   show the board again.
    pass                    give up the turn, only allowed when no piece can move.
    restart                 start over (not available in network games).
    quit                    leave the game.

Pieces are shown as R (first, red) or B (second, blue) followed by their term.
The selected piece is in [brackets], its destinations are marked ::, and pieces of an
equation being resolved are in <angle brackets>.

Constants step one cell forward. Linear terms move up to two cells along a row or
column. Quadratic terms move up to three cells along a row, column or diagonal. Pieces
cannot jump. A move that lines up pieces of both sides with a quadratic term forms an
equation: real solutions remove the opponent's pieces in the line, complex solutions
remove yours.";

/// Everything needed to play one game at this terminal.
struct Session<B> {
    game: Game,
    input: InputReader<B>,
    rng: StdRng,
    pacing: Pacing,
    peer: Option<Peer>,
}

impl<B: BufRead> Session<B> {
    /// Play until the game ends and the player does not want another, or someone quits.
    fn run(&mut self) -> io::Result<()> {
        println!("Type help or ? for commands.");
        loop {
            let keep_playing = match self.game.state() {
                TurnState::GameOver(result) => self.game_over(result)?,
                TurnState::Resolving(phase) => {
                    self.show_phase(phase);
                    true
                }
                TurnState::AwaitingSelection => match self.game.controller(self.game.active()) {
                    Controller::Local => self.local_turn()?,
                    Controller::Computer => {
                        self.computer_turn();
                        true
                    }
                    Controller::Remote => self.remote_turn()?,
                },
            };
            if !keep_playing {
                return Ok(());
            }
        }
    }

    fn local_turn(&mut self) -> io::Result<bool> {
        let side = self.game.active();
        println!();
        show_game(&self.game);
        let prompt = format!("{} >", SideName(side));
        let cmd = self.input.read_input_lower(&prompt, parse_command)?;
        match cmd {
            Command::Select(pos) if !self.game.board().dimensions().contains(pos) => {
                println!("{} is off the board.", pos);
            }
            Command::Select(pos) => {
                let origin = self.game.selection();
                match self.game.select(pos) {
                    Ok(SelectOutcome::Selected { pos, destinations }) => {
                        if destinations.is_empty() {
                            println!("Selected {}, but it cannot move.", pos);
                        } else {
                            let list = PositionList(&destinations);
                            println!("Selected {}. Destinations: {}", pos, list);
                        }
                    }
                    Ok(SelectOutcome::Cleared) => println!("Selection cleared."),
                    Ok(SelectOutcome::Moved(outcome)) => {
                        if let Some(from) = origin {
                            self.after_local_move(side, Move::new(from, pos), &outcome)?;
                        }
                    }
                    Ok(SelectOutcome::Ignored) => println!("{} is not one of your pieces.", pos),
                    Err(err) => println!("{}", err),
                }
            }
            Command::Move(mv) => match self.game.try_move(mv) {
                Ok(outcome) => self.after_local_move(side, mv, &outcome)?,
                Err(err) => println!("Cannot move {}: {}", mv, err.reason()),
            },
            Command::Moves => {
                if let Some(pos) = self.game.selection() {
                    let list = PositionList(self.game.destinations());
                    println!("{} can move to {}", pos, list);
                } else {
                    let moves = legal_moves(self.game.board(), side);
                    if moves.is_empty() {
                        println!("No piece can move. Type pass to end your turn.");
                    }
                    for mv in moves {
                        println!("    {}", mv);
                    }
                }
            }
            Command::Board => {}
            Command::Pass if self.peer.is_some() => {
                println!("Passing is not available in network games.");
            }
            Command::Pass if !legal_moves(self.game.board(), side).is_empty() => {
                println!("You still have legal moves.");
            }
            Command::Pass => {
                self.game.pass_turn();
                println!("{} passes.", SideName(side));
            }
            Command::Restart if self.peer.is_some() => {
                println!("Network games cannot be restarted.");
            }
            Command::Restart => self.game.restart(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Report a move made at this terminal and forward it to the peer, if any.
    fn after_local_move(&mut self, side: Side, mv: Move, outcome: &MoveOutcome) -> io::Result<()> {
        println!("{} moved {}", SideName(side), mv);
        report_outcome(outcome);
        if let Some(peer) = self.peer.as_mut() {
            peer.channel.send(&mv.into()).map_err(channel_io)?;
        }
        Ok(())
    }

    fn computer_turn(&mut self) {
        let side = self.game.active();
        thread::sleep(self.pacing.ai_delay);
        match self.game.play_computer_turn(&mut self.rng) {
            Ok(Some(mv)) => {
                println!("Computer ({}) plays {}", SideName(side), mv);
                match self.game.pending_events().count() {
                    0 => println!("{} to move.", SideName(self.game.active())),
                    formed => report_equations(formed),
                }
            }
            Ok(None) => println!("Computer ({}) cannot move and passes.", SideName(side)),
            Err(err) => log::error!("computer could not move: {}", err),
        }
    }

    /// Wait for the peer's move and play it. Returns false if the peer went away.
    fn remote_turn(&mut self) -> io::Result<bool> {
        let peer = match self.peer.as_mut() {
            Some(peer) => peer,
            None => {
                return Err(io::Error::new(io::ErrorKind::NotConnected, "no opponent is connected"))
            }
        };
        println!("Waiting for the opponent's move...");
        loop {
            let message = match peer.channel.recv().map_err(channel_io)? {
                Some(message) => message,
                None => {
                    println!("The opponent disconnected.");
                    return Ok(false);
                }
            };
            if let Some(PeerEvent::MoveReceived(mv)) = peer.role.interpret(message) {
                match self.game.apply_remote_move(mv) {
                    Ok(outcome) => {
                        println!("Opponent plays {}", mv);
                        report_outcome(&outcome);
                    }
                    Err(err) => println!("Opponent sent a move that cannot be played: {}", err),
                }
                return Ok(true);
            }
        }
    }

    /// Show the current equation for one phase, then move on.
    fn show_phase(&mut self, phase: Phase) {
        if let Some(event) = self.game.current_event() {
            match phase {
                Phase::Identify => {
                    println!();
                    show_game(&self.game);
                    println!("Analyzing: {} = 0", event.polynomial());
                }
                Phase::Resolve if event.is_solvable() => {
                    println!("REAL solutions (\u{394} \u{2265} 0). Opponent removed.");
                }
                Phase::Resolve => println!("COMPLEX solutions (\u{394} < 0). Backfire!"),
            }
        }
        thread::sleep(self.pacing.phase);
        if let Some(Advance::Resolved { event, removed }) = self.game.advance() {
            log::debug!("{} {} piece(s) removed", removed, event.loser());
        }
    }

    /// Announce the result. Returns true if a new game was started.
    fn game_over(&mut self, result: GameResult) -> io::Result<bool> {
        println!();
        show_game(&self.game);
        println!("Game over, {}.", result);
        if self.peer.is_some() {
            return Ok(false);
        }
        let again = self.input.read_input_lower("Play again? (y/N)", |input| match input {
            "yes" | "y" => Some(true),
            "no" | "n" | "" => Some(false),
            _ => {
                println!("Invalid selection.");
                None
            }
        })?;
        if again {
            self.game.restart();
        }
        Ok(again)
    }
}

fn report_outcome(outcome: &MoveOutcome) {
    match outcome {
        MoveOutcome::Quiet { next } => println!("{} to move.", SideName(*next)),
        MoveOutcome::Equations(events) => report_equations(events.len()),
    }
}

fn report_equations(formed: usize) {
    if formed == 1 {
        println!("An equation formed!");
    } else {
        println!("{} equations formed!", formed);
    }
}

/// Print out the board with the selection, its destinations and the current equation.
fn show_game(game: &Game) {
    let board = game.board();
    let selected = game.selection();
    let destinations = game.destinations();
    let chain = game.current_event().map_or(&[][..], |event| event.chain());
    show_board(
        board.dimensions().cols(),
        board.dimensions().iter_rows().map(move |row| {
            row.map(move |pos| match board.get(pos) {
                Some(&piece) if selected == Some(pos) => BoardCell::Selected(piece),
                Some(&piece) if chain.contains(&pos) => BoardCell::Chain(piece),
                Some(&piece) => BoardCell::Piece(piece),
                None if destinations.contains(&pos) => BoardCell::Destination,
                None => BoardCell::Empty,
            })
        }),
    );
    if let Some(pos) = selected {
        println!("Selected: {}", pos);
    }
}

/// One cell of the printed board.
enum BoardCell {
    Empty,
    Destination,
    Piece(Piece),
    Selected(Piece),
    Chain(Piece),
}

impl fmt::Display for BoardCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoardCell::Empty => f.pad("."),
            BoardCell::Destination => f.pad("::"),
            BoardCell::Piece(piece) => f.pad(&PieceLabel(*piece).to_string()),
            BoardCell::Selected(piece) => f.pad(&format!("[{}]", PieceLabel(*piece))),
            BoardCell::Chain(piece) => f.pad(&format!("<{}>", PieceLabel(*piece))),
        }
    }
}

/// Show the board by printing the grid. Takes an iterator over the rows of iterators over
/// the items.
fn show_board(cols: usize, rows: impl Iterator<Item = impl Iterator<Item = impl fmt::Display>>) {
    print!("   ");
    for i in 0..cols {
        print!("{:^9}", i);
    }
    println!();
    for (i, row) in rows.enumerate() {
        print!("{:>2} ", i);
        for cell in row {
            print!("{:^9}", cell);
        }
        println!();
    }
}

/// Display helper that prints a piece's owner marker followed by its term.
struct PieceLabel(Piece);

impl fmt::Display for PieceLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = match self.0.owner() {
            Side::First => 'R',
            Side::Second => 'B',
        };
        write!(f, "{}{}", marker, self.0.term())
    }
}

/// Display helper that prints a side with its color.
struct SideName(Side);

impl fmt::Display for SideName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self.0 {
            Side::First => "First (red)",
            Side::Second => "Second (blue)",
        })
    }
}

/// Display helper that prints a list of positions.
struct PositionList<'a>(&'a [Position]);

impl fmt::Display for PositionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut positions = self.0.iter();
        match positions.next() {
            None => f.pad("none"),
            Some(first) => {
                write!(f, "{}", first)?;
                for pos in positions {
                    write!(f, " {}", pos)?;
                }
                Ok(())
            }
        }
    }
}

/// Helper to read input from the player.
struct InputReader<B> {
    read: B,
    buf: String,
}

impl<B> InputReader<B> {
    fn new(read: B) -> Self {
        Self {
            read,
            buf: String::new(),
        }
    }
}

impl<B: BufRead> InputReader<B> {
    /// Repeatedly tries to read input until the input checker returns `Some`. Converts
    /// to ascii lower before running the checker.
    fn read_input_lower<F, T>(&mut self, prompt: &str, mut checker: F) -> io::Result<T>
    where
        F: FnMut(&str) -> Option<T>,
    {
        loop {
            self.read_input_inner(prompt)?;
            self.buf.make_ascii_lowercase();
            if let Some(val) = checker(self.buf.trim()) {
                return Ok(val);
            }
        }
    }

    /// Helper to print the prompt, clear the string buffer and read a line.
    fn read_input_inner(&mut self, prompt: &str) -> io::Result<()> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        self.buf.clear();
        if self.read.read_line(&mut self.buf)? == 0 {
            println!();
            std::process::exit(0);
        }
        Ok(())
    }
}
