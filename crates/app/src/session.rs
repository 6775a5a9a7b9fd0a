use datavis_core::{parse_value, DataVisError, Result, SceneGraph, StructureKind};

/// A line typed into the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Insert(i64),
    Remove,
    Play,
    Stop,
    Kind(StructureKind),
    Size(f32),
    Spacing(f32),
    Speed(f32),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  insert <n> | <n>      append a value
  remove                remove from the structure's removal end
  play | stop           toggle auto-play
  kind <queue|stack|array|ring>
  size <x> | spacing <x> | speed <x>
  show | help | quit";

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match head.to_ascii_lowercase().as_str() {
            "insert" | "i" | "push" | "enqueue" => {
                let value = arg.and_then(parse_value).ok_or_else(|| {
                    DataVisError::InvalidInput("insert expects an integer".into())
                })?;
                Command::Insert(value)
            }
            "remove" | "r" | "pop" | "dequeue" => Command::Remove,
            "play" => Command::Play,
            "stop" => Command::Stop,
            "kind" => Command::Kind(required(arg, "kind")?.parse()?),
            "size" => Command::Size(number(arg, "size")?),
            "spacing" => Command::Spacing(number(arg, "spacing")?),
            "speed" => Command::Speed(number(arg, "speed")?),
            "show" | "ls" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => match parse_value(other) {
                Some(value) => Command::Insert(value),
                None => {
                    return Err(DataVisError::InvalidInput(format!(
                        "unknown command `{other}`"
                    )))
                }
            },
        };
        Ok(Some(command))
    }
}

fn required<'a>(arg: Option<&'a str>, name: &str) -> Result<&'a str> {
    arg.ok_or_else(|| DataVisError::InvalidInput(format!("{name} expects an argument")))
}

fn number(arg: Option<&str>, name: &str) -> Result<f32> {
    required(arg, name)?
        .parse()
        .map_err(|_| DataVisError::InvalidInput(format!("{name} expects a number")))
}

/// One-line text rendering of the scene, e.g. `queue: 1@(-3.0, 0.0) 2@(0.0, 0.0)`.
pub fn describe(kind: StructureKind, scene: &SceneGraph) -> String {
    if scene.meshes().is_empty() {
        return format!("{kind}: (empty)");
    }
    let meshes: Vec<String> = scene
        .meshes()
        .iter()
        .map(|mesh| {
            format!(
                "{}@({:.1}, {:.1})",
                mesh.value, mesh.position.x, mesh.position.y
            )
        })
        .collect();
    format!("{kind}: {}", meshes.join(" "))
}
