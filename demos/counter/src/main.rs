use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use anyhow::Context;
use hookline_core::prelude::*;
use hookline_devtools::{Inspector, to_json};

/// Line-oriented renderer: each frame is printed as a block of text.
struct TextRenderer;

struct Terminal<W: Write> {
    out: W,
    frames: usize,
}

impl Terminal<io::Stdout> {
    fn stdout() -> Self {
        Self {
            out: io::stdout(),
            frames: 0,
        }
    }
}

impl Renderer for TextRenderer {
    type Tree = Vec<String>;
    type Target = Terminal<io::Stdout>;

    fn draw(&mut self, component: &Component<Vec<String>>, target: &mut Self::Target) {
        let lines = component.render();
        target.frames += 1;

        let mut out = target.out.lock();
        let written = writeln!(out, "--- frame {} ---", target.frames)
            .and_then(|_| lines.iter().try_for_each(|l| writeln!(out, "{l}")));
        if let Err(err) = written {
            log::error!("failed to draw frame {}: {err}", target.frames);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Count4 {
    count: i32,
}

#[derive(Debug, Clone)]
enum Count4Action {
    Increment,
    Decrement,
    Reset(i32),
}

const COUNT4_INITIAL: i32 = 50;

fn count4_init(count: i32) -> Count4 {
    Count4 { count }
}

fn count4_reducer(state: &Count4, action: Count4Action) -> Count4 {
    match action {
        Count4Action::Increment => Count4 {
            count: state.count + 1,
        },
        Count4Action::Decrement => Count4 {
            count: state.count - 1,
        },
        Count4Action::Reset(to) => count4_init(to),
    }
}

/// Custom hook: a dotted string kept split into its parts.
fn use_split_url(url: &str) -> (Vec<String>, Setter<String>) {
    let (text, set_text) = use_state(url.to_string());
    (text.split('.').map(str::to_string).collect(), set_text)
}

/// Handles the "buttons" of the last rendered frame.
#[derive(Clone)]
struct Controls {
    set_count1: Setter<i32>,
    set_count2: Setter<i32>,
    set_count3: Setter<i32>,
    set_text: Setter<String>,
    count4: Dispatch<Count4Action>,
}

fn counter(controls: Rc<RefCell<Option<Controls>>>) -> impl Fn() -> Vec<String> {
    move || {
        let (count1, set_count1) = use_state(10);
        let (count2, set_count2) = use_state(20);
        let (count3, set_count3) = use_state(30);
        let (text, set_text) = use_split_url("www.netlify.com");
        let my_ref = use_ref(0);

        let my_memo = use_memo(
            move || {
                log::info!("(re)calculating my_memo");
                count1 + count2 + count3
            },
            deps![count1, count2, count3],
        );

        use_effect(|| log::info!("effect #1: first render only"), deps![]);
        use_effect(|| log::info!("effect #2: every render"), None);
        {
            let my_ref = my_ref.clone();
            use_effect(
                move || {
                    log::info!("effect #3: count2 or count3 changed");
                    my_ref.with_current(|r| *r += 1);
                    on_cleanup(|| log::info!("effect #3 cleanup"))
                },
                deps![count2, count3],
            );
        }

        let (count4, count4_dispatch) =
            use_reducer_with_init(count4_reducer, COUNT4_INITIAL, count4_init);

        *controls.borrow_mut() = Some(Controls {
            set_count1,
            set_count2,
            set_count3,
            set_text,
            count4: count4_dispatch,
        });

        vec![
            format!("1st count is: {count1}  [-] [+]"),
            format!("2nd count is: {count2}  [-] [+]"),
            format!("3rd count is: {count3}  [-] [+] [keep the same]"),
            format!("4th count: {}  [-] [+] [reset]", count4.count),
            format!("Text is: {}  [replace text]", text.join(" + ")),
            format!("myRef is: {}", my_ref.current()),
            format!("myMemo is: {my_memo}"),
        ]
    }
}

type Click = (&'static str, fn(&Controls));

const SCRIPT: &[Click] = &[
    ("1st +", |c| c.set_count1.update(|n| n + 1)),
    ("2nd + (updater)", |c| c.set_count2.update(|n| n + 1)),
    ("3rd keep the same", |c| c.set_count3.update(|n| *n)),
    ("3rd -", |c| c.set_count3.update(|n| n - 1)),
    ("4th +", |c| c.count4.call(Count4Action::Increment)),
    ("4th -", |c| c.count4.call(Count4Action::Decrement)),
    ("4th reset", |c| c.count4.call(Count4Action::Reset(COUNT4_INITIAL))),
    ("replace text", |c| c.set_text.set("reactjs.org".to_string())),
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let controls = Rc::new(RefCell::new(None));
    let root = Root::with_options(TextRenderer, RootOptions::default().label("counter"));
    root.render(counter(controls.clone()), Terminal::stdout());

    let mut inspector = Inspector::new();
    inspector.hud.enabled = std::env::var_os("HOOKLINE_INSPECT").is_some();

    for (label, click) in SCRIPT {
        let current = controls
            .borrow()
            .clone()
            .context("counter has not rendered")?;
        log::info!("click: {label}");
        click(&current);

        if let Some(report) = inspector.frame(&root) {
            println!("{report}");
        }
    }

    if std::env::args().any(|a| a == "--json") {
        println!("{}", to_json(&root)?);
    }

    let mut terminal = root.unmount().context("counter was not mounted")?;
    log::info!("drew {} frames", terminal.frames);
    terminal.out.flush()?;
    Ok(())
}
