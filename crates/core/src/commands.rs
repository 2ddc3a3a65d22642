use std::collections::HashMap;

/// Show-level actions reachable from the input surface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShowCommand {
    StartShow,
    StopShow,
}

/// Maps single input bytes to show commands. The reference wiring binds `v`
/// to start; everything else is silently ignored.
pub struct CommandDispatcher {
    bindings: HashMap<u8, ShowCommand>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        CommandDispatcher {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, byte: u8, command: ShowCommand) {
        self.bindings.insert(byte, command);
    }

    pub fn dispatch(&self, byte: u8) -> Option<ShowCommand> {
        self.bindings.get(&byte).copied()
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.bind(b'v', ShowCommand::StartShow);
        dispatcher.bind(b's', ShowCommand::StopShow);
        dispatcher
    }
}
