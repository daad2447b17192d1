//! Worker-side driver and the line protocol it speaks
//!
//! One request per line on the worker's stdin, one reply per line on its
//! stdout. The driver moves the protocol onto private descriptors and points
//! fds 0 and 1 at /dev/null, so user code (and anything it spawns) can't
//! corrupt the channel.

use serde::{Deserialize, Serialize};

/// Python source passed with `-c`
pub(crate) const DRIVER_SCRIPT: &str = r##"
import code, io, json, os, sys, traceback

def _lines(source, namespace, err):
    console = code.InteractiveInterpreter(namespace)
    for statement in source.split("\n"):
        statement = statement.strip()
        if not statement or statement.startswith("#"):
            continue
        try:
            if console.runsource(statement, "<input>", "single"):
                err.write("Incomplete input: %s\n" % statement)
        except Exception as exc:
            err.write("Error in statement '%s': %s\n" % (statement, exc))

def _run(source, namespace):
    out, err = io.StringIO(), io.StringIO()
    saved = sys.stdout, sys.stderr, sys.stdin
    sys.stdout, sys.stderr, sys.stdin = out, err, io.StringIO()
    result = None
    try:
        try:
            compiled = compile(source, "<input>", "eval")
        except SyntaxError:
            compiled = None
        if compiled is not None:
            value = eval(compiled, namespace)
            if value is not None:
                result = repr(value)
        else:
            try:
                compiled = compile(source, "<input>", "exec")
            except SyntaxError as exc:
                err.write("Error: %s\n" % exc)
                _lines(source, namespace, err)
            else:
                exec(compiled, namespace)
    except Exception:
        etype, value, tb = sys.exc_info()
        traceback.print_exception(etype, value, tb.tb_next, file=err)
    finally:
        sys.stdout, sys.stderr, sys.stdin = saved
    return {"stdout": out.getvalue(), "stderr": err.getvalue(), "result": result}

def _main():
    requests = os.fdopen(os.dup(0), "r", encoding="utf-8")
    replies = os.fdopen(os.dup(1), "w", encoding="utf-8")
    null = os.open(os.devnull, os.O_RDWR)
    os.dup2(null, 0)
    os.dup2(null, 1)
    namespace = {"__name__": "__main__", "__builtins__": __builtins__}
    for line in requests:
        line = line.strip()
        if not line:
            continue
        try:
            source = json.loads(line)["code"]
        except Exception as exc:
            reply = {"stdout": "", "stderr": "Malformed request: %s\n" % exc, "result": None}
        else:
            reply = _run(source, namespace)
        replies.write(json.dumps(reply) + "\n")
        replies.flush()

_main()
"##;

#[derive(Debug, Serialize)]
pub(crate) struct WorkerRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct WorkerReply {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub result: Option<String>,
}
