use super::SystemContext;
use crate::object::{error::RuntimeError, Builtin, Object, NULL};
use std::{collections::HashMap, sync::LazyLock};

pub static BUILTINS: LazyLock<HashMap<&'static str, Builtin>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert(
        "len",
        Builtin {
            name: "len",
            function: len,
        },
    );
    map.insert(
        "print",
        Builtin {
            name: "print",
            function: print,
        },
    );
    map
});

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).copied()
}

/// Byte length of a string.
fn len(arguments: &[Object], _: &mut dyn SystemContext) -> Result<Object, RuntimeError> {
    let [argument] = arguments else {
        return Err(RuntimeError::InvalidArgumentCount {
            actual: arguments.len(),
            expected: 1,
        });
    };
    match argument {
        Object::String(value) => Ok(Object::Integer(value.len() as i64)),
        _ => Err(RuntimeError::NonStringArgument),
    }
}

/// Writes the display forms of every argument back to back on one line.
fn print(arguments: &[Object], context: &mut dyn SystemContext) -> Result<Object, RuntimeError> {
    let line: String = arguments.iter().map(|argument| argument.to_string()).collect();
    context.writeln(&line);
    Ok(NULL)
}
