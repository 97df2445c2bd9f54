//! Built-in exercise tracks and their grading rule tables.
//!
//! The static tables guarantee the app is useful without external config;
//! additional tracks can be supplied through the TOML bank (`config.rs`).
//! Rule patterns are authored against `grader::normalize` output: lowercase,
//! no newlines/tabs, single spaces. Keep new patterns in that form.

use regex::Regex;
use tracing::error;

use crate::config::TrackCfg;
use crate::domain::{CompiledRule, Exercise, ExerciseKind, Track, TrackSource};

struct RuleDef {
  description: &'static str,
  pattern: &'static str,
}

struct ExerciseDef {
  kind: ExerciseKind,
  title: &'static str,
  description: &'static str,
  // coding
  task: &'static str,
  initial_code: &'static str,
  solution: &'static str,
  hints: &'static [&'static str],
  rules: &'static [RuleDef],
  // multiple choice
  question: &'static str,
  options: &'static [&'static str],
  correct_answer: &'static str,
  explanation: &'static str,
}

struct TrackDef {
  id: &'static str,
  title: &'static str,
  language: &'static str,
  exercises: &'static [ExerciseDef],
}

macro_rules! rule {
  ($desc:expr, $pat:expr) => {
    RuleDef { description: $desc, pattern: $pat }
  };
}

macro_rules! coding {
  ($title:expr, $desc:expr, $task:expr, $initial:expr, $solution:expr, $hints:expr, $rules:expr) => {
    ExerciseDef {
      kind: ExerciseKind::Coding,
      title: $title,
      description: $desc,
      task: $task,
      initial_code: $initial,
      solution: $solution,
      hints: $hints,
      rules: $rules,
      question: "",
      options: &[],
      correct_answer: "",
      explanation: "",
    }
  };
}

macro_rules! choice {
  ($title:expr, $desc:expr, $question:expr, $options:expr, $answer:expr, $explanation:expr) => {
    ExerciseDef {
      kind: ExerciseKind::MultipleChoice,
      title: $title,
      description: $desc,
      task: "",
      initial_code: "",
      solution: "",
      hints: &[],
      rules: &[],
      question: $question,
      options: $options,
      correct_answer: $answer,
      explanation: $explanation,
    }
  };
}

const HTML_BEGINNER: &[ExerciseDef] = &[
  choice!(
    "HTML Document Type",
    "Understanding the basics of HTML document structure",
    "What is a correct HTML markup for the document type declaration?",
    &["<!DOCTYPE html>", "DOCTYPE html;", "--DOCTYPE html;"],
    "<!DOCTYPE html>",
    "The correct DOCTYPE declaration for HTML5 is <!DOCTYPE html>. It must be the very first line in your HTML document."
  ),
  choice!(
    "HTML Basic Structure",
    "Learn about the essential HTML elements",
    "Which set of tags is required in a valid HTML document?",
    &["<html>, <head>, and <body>", "<header> and <footer>", "<div> and <span>"],
    "<html>, <head>, and <body>",
    "Every HTML document requires the basic structure of <html>, <head>, and <body> tags."
  ),
  choice!(
    "HTML Headings",
    "Understanding HTML heading levels",
    "Which heading tag represents the most important heading in HTML?",
    &["<h1>", "<h6>", "<heading>"],
    "<h1>",
    "<h1> is the highest level heading tag and should be used for the main heading of your page."
  ),
  coding!(
    "Creating a Basic Web Page",
    "Create a simple web page with a heading and a paragraph.",
    "Add an <h1> heading that says 'My First Web Page' and a <p> paragraph that says 'Welcome to my website!'",
    r#"<!DOCTYPE html>
<html>
<head>
    <title>Basic Web Page</title>
</head>
<body>
    <!-- Add your code here -->

</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
    <title>Basic Web Page</title>
</head>
<body>
    <h1>My First Web Page</h1>
    <p>Welcome to my website!</p>
</body>
</html>"#,
    &[
      "Use <h1> tags for the main heading",
      "Use <p> tags for the paragraph",
    ],
    &[
      rule!(
        "an <h1> heading with the text 'My First Web Page'",
        r"<h1[^>]*>\s*my\s*first\s*web\s*page\s*</h1>"
      ),
      rule!(
        "a <p> paragraph with the text 'Welcome to my website!'",
        r"<p[^>]*>\s*welcome\s*to\s*my\s*website!?\s*</p>"
      ),
    ]
  ),
];

const CSS_BEGINNER: &[ExerciseDef] = &[
  coding!(
    "Basic CSS Syntax",
    "Learn how to write basic CSS rules",
    "Style the heading with red color and the paragraph with blue color.",
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        /* Add your CSS here */

    </style>
</head>
<body>
    <h1>Welcome to CSS</h1>
    <p>This is a paragraph.</p>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        h1 {
            color: red;
        }
        p {
            color: blue;
        }
    </style>
</head>
<body>
    <h1>Welcome to CSS</h1>
    <p>This is a paragraph.</p>
</body>
</html>"#,
    &[
      "Use h1 selector for the heading",
      "Use p selector for the paragraph",
      "The color property sets text color",
    ],
    &[
      rule!(
        "a rule coloring the heading red (h1 { color: red; })",
        r"h1\s*\{\s*color\s*:\s*red\s*;?\s*\}"
      ),
      rule!(
        "a rule coloring the paragraph blue (p { color: blue; })",
        r"p\s*\{\s*color\s*:\s*blue\s*;?\s*\}"
      ),
    ]
  ),
  coding!(
    "Font Properties",
    "Learn to style text with font properties",
    "Style the heading with font-size: 24px and font-family: Arial, and make the paragraph text bold.",
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        /* Add your CSS here */

    </style>
</head>
<body>
    <h1>Styling Fonts</h1>
    <p>This text should be bold.</p>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        h1 {
            font-size: 24px;
            font-family: Arial, sans-serif;
        }
        p {
            font-weight: bold;
        }
    </style>
</head>
<body>
    <h1>Styling Fonts</h1>
    <p>This text should be bold.</p>
</body>
</html>"#,
    &[
      "Use font-size to change text size",
      "Use font-family to change the font",
      "Use font-weight: bold for bold text",
    ],
    &[
      rule!(
        "the heading sized with font-size: 24px",
        r"h1\s*\{[^}]*font-size\s*:\s*24px[^}]*\}"
      ),
      rule!(
        "the heading using font-family: Arial",
        r"h1\s*\{[^}]*font-family\s*:\s*arial"
      ),
      rule!(
        "the paragraph made bold with font-weight: bold",
        r"p\s*\{[^}]*font-weight\s*:\s*bold[^}]*\}"
      ),
    ]
  ),
  coding!(
    "Margin and Padding",
    "Understanding box model basics",
    "Add 20px padding to the heading and 10px margin to all sides of the paragraph.",
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        /* Add your CSS here */

    </style>
</head>
<body>
    <h1>Box Model</h1>
    <p>This paragraph needs margin.</p>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        h1 {
            padding: 20px;
        }
        p {
            margin: 10px;
        }
    </style>
</head>
<body>
    <h1>Box Model</h1>
    <p>This paragraph needs margin.</p>
</body>
</html>"#,
    &[
      "Use padding property for inner spacing",
      "Use margin property for outer spacing",
      "You can use shorthand for all sides",
    ],
    &[
      rule!(
        "the heading given padding: 20px",
        r"h1\s*\{[^}]*padding\s*:\s*20px[^}]*\}"
      ),
      rule!(
        "the paragraph given margin: 10px",
        r"p\s*\{[^}]*margin\s*:\s*10px[^}]*\}"
      ),
    ]
  ),
  coding!(
    "Basic Colors and Backgrounds",
    "Working with colors and backgrounds",
    "Give the heading a yellow background and the paragraph a light gray background (use #f0f0f0).",
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        /* Add your CSS here */

    </style>
</head>
<body>
    <h1>Colors and Backgrounds</h1>
    <p>This needs a light gray background.</p>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
    <style>
        h1 {
            background-color: yellow;
        }
        p {
            background-color: #f0f0f0;
        }
    </style>
</head>
<body>
    <h1>Colors and Backgrounds</h1>
    <p>This needs a light gray background.</p>
</body>
</html>"#,
    &[
      "Use background-color property",
      "Colors can be named (like 'yellow')",
      "Or use hex codes (like '#f0f0f0')",
    ],
    &[
      rule!(
        "the heading given background-color: yellow",
        r"h1\s*\{[^}]*background-color\s*:\s*yellow[^}]*\}"
      ),
      rule!(
        "the paragraph given background-color: #f0f0f0",
        r"p\s*\{[^}]*background-color\s*:\s*#f0f0f0[^}]*\}"
      ),
    ]
  ),
];

const JS_BEGINNER: &[ExerciseDef] = &[
  coding!(
    "Basic Function and DOM",
    "Functions, prompt input, and updating the page",
    "Write JavaScript code to display a greeting message",
    r#"<!DOCTYPE html>
<html>
<head>
  <title>JavaScript Exercise</title>
</head>
<body>
  <button onclick="greet()">Say Hello</button>
  <p id="greeting"></p>

  <script>
    // Write your function here

  </script>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
  <title>JavaScript Exercise</title>
</head>
<body>
  <button onclick="greet()">Say Hello</button>
  <p id="greeting"></p>

  <script>
    function greet() {
      const name = prompt("What's your name?");
      document.getElementById("greeting").textContent = "Hello, " + name + "!";
    }
  </script>
</body>
</html>"#,
    &[
      "Create a function named greet()",
      "Use prompt() to get user input",
      "Update the text content using getElementById()",
    ],
    &[
      rule!("a function named greet()", r"function\s+greet\s*\(\s*\)"),
      rule!("a prompt() call to read the name", r"prompt\s*\([^)]*\)"),
      rule!("an assignment to textContent", r"textcontent\s*="),
    ]
  ),
  coding!(
    "Numbers and Math",
    "Reading inputs, converting to numbers, and adding them",
    "Create a simple calculator that adds two numbers and displays the result",
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Calculator Exercise</title>
</head>
<body>
  <input type="number" id="num1" placeholder="First number">
  <input type="number" id="num2" placeholder="Second number">
  <button onclick="calculate()">Add Numbers</button>
  <p id="result"></p>

  <script>
    // Write your calculator function here

  </script>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Calculator Exercise</title>
</head>
<body>
  <input type="number" id="num1" placeholder="First number">
  <input type="number" id="num2" placeholder="Second number">
  <button onclick="calculate()">Add Numbers</button>
  <p id="result"></p>

  <script>
    function calculate() {
      const num1 = Number(document.getElementById("num1").value);
      const num2 = Number(document.getElementById("num2").value);
      const sum = num1 + num2;
      document.getElementById("result").textContent = "Result: " + sum;
    }
  </script>
</body>
</html>"#,
    &[
      "Use Number() to convert string inputs to numbers",
      "Get input values using .value property",
      "Display the sum in the result paragraph",
    ],
    &[
      rule!("a function named calculate()", r"function\s+calculate\s*\(\s*\)"),
      rule!("a Number() conversion of the inputs", r"number\s*\("),
      rule!("an addition of the two values", r"[+]"),
    ]
  ),
  coding!(
    "Strings and Text",
    "Splitting, reversing, and joining strings",
    "Create a text reverser that takes input and displays it backwards",
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Text Reverser</title>
</head>
<body>
  <input type="text" id="textInput" placeholder="Enter text">
  <button onclick="reverseText()">Reverse</button>
  <p id="output"></p>

  <script>
    // Write your reverse function here

  </script>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Text Reverser</title>
</head>
<body>
  <input type="text" id="textInput" placeholder="Enter text">
  <button onclick="reverseText()">Reverse</button>
  <p id="output"></p>

  <script>
    function reverseText() {
      const text = document.getElementById("textInput").value;
      const reversed = text.split('').reverse().join('');
      document.getElementById("output").textContent = reversed;
    }
  </script>
</body>
</html>"#,
    &[
      "Split the string into an array of characters",
      "Use reverse() to reverse the array",
      "Join the characters back into a string",
    ],
    &[
      rule!("a function named reverseText()", r"function\s+reversetext\s*\(\s*\)"),
      rule!(
        "split('') followed by reverse()",
        r#"split\s*\(\s*['"]['"]\s*\).*?reverse\s*\(\s*\)"#
      ),
      rule!("join('') to rebuild the string", r#"join\s*\(\s*['"]['"]\s*\)"#),
    ]
  ),
  coding!(
    "Conditionals",
    "Branching on user input with if/else",
    "Create an age checker that tells if someone is old enough to vote (18+)",
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Age Checker</title>
</head>
<body>
  <input type="number" id="age" placeholder="Enter your age">
  <button onclick="checkAge()">Check Eligibility</button>
  <p id="result"></p>

  <script>
    // Write your age checking function here

  </script>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Age Checker</title>
</head>
<body>
  <input type="number" id="age" placeholder="Enter your age">
  <button onclick="checkAge()">Check Eligibility</button>
  <p id="result"></p>

  <script>
    function checkAge() {
      const age = Number(document.getElementById("age").value);
      const result = document.getElementById("result");
      if (age >= 18) {
        result.textContent = "You are eligible to vote!";
      } else {
        result.textContent = "You must be 18 or older to vote.";
      }
    }
  </script>
</body>
</html>"#,
    &[
      "Use if/else statement to check age",
      "Remember to convert input to a number",
      "Display appropriate message based on age",
    ],
    &[
      rule!("a function named checkAge()", r"function\s+checkage\s*\(\s*\)"),
      rule!("an if statement on the age", r"if\s*\([^)]*\)"),
      rule!("a comparison against 18", r">=[^=]?\s*18"),
    ]
  ),
  coding!(
    "Arrays and Loops",
    "Building list items in a for loop",
    "Create a number list generator that creates a list of numbers from 1 to N",
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Number List Generator</title>
</head>
<body>
  <input type="number" id="count" placeholder="Enter a number">
  <button onclick="generateList()">Generate List</button>
  <ul id="numberList"></ul>

  <script>
    // Write your list generator function here

  </script>
</body>
</html>"#,
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Number List Generator</title>
</head>
<body>
  <input type="number" id="count" placeholder="Enter a number">
  <button onclick="generateList()">Generate List</button>
  <ul id="numberList"></ul>

  <script>
    function generateList() {
      const count = Number(document.getElementById("count").value);
      const list = document.getElementById("numberList");
      list.innerHTML = "";
      for (let i = 1; i <= count; i++) {
        const li = document.createElement("li");
        li.textContent = i;
        list.appendChild(li);
      }
    }
  </script>
</body>
</html>"#,
    &[
      "Use a for loop to count from 1 to N",
      "Create li elements using createElement",
      "Append each number as a list item",
    ],
    &[
      rule!("a function named generateList()", r"function\s+generatelist\s*\(\s*\)"),
      rule!("a for loop over the range", r"for\s*\([^)]*\)"),
      rule!("appendChild() calls adding the items", r"appendchild\s*\("),
    ]
  ),
];

const BUILTIN_TRACKS: &[TrackDef] = &[
  TrackDef { id: "html-beginner", title: "HTML Beginner Exercises", language: "html", exercises: HTML_BEGINNER },
  TrackDef { id: "css-beginner", title: "CSS Beginner Exercises", language: "css", exercises: CSS_BEGINNER },
  TrackDef { id: "js-beginner", title: "JavaScript Beginner Exercises", language: "javascript", exercises: JS_BEGINNER },
];

/// Compile the built-in tables into runtime tracks.
pub fn builtin_tracks() -> Vec<Track> {
  BUILTIN_TRACKS
    .iter()
    .map(|def| Track {
      id: def.id.to_string(),
      title: def.title.to_string(),
      language: def.language.to_string(),
      source: TrackSource::BuiltIn,
      exercises: def.exercises.iter().map(compile_exercise_def).collect(),
    })
    .collect()
}

fn compile_exercise_def(def: &ExerciseDef) -> Exercise {
  Exercise {
    title: def.title.to_string(),
    description: def.description.to_string(),
    kind: def.kind.clone(),
    task: def.task.to_string(),
    initial_code: def.initial_code.to_string(),
    solution: def.solution.to_string(),
    hints: def.hints.iter().map(|h| (*h).to_string()).collect(),
    rules: def
      .rules
      .iter()
      .filter_map(|r| compile_rule(def.title, r.description, r.pattern))
      .collect(),
    question: def.question.to_string(),
    options: def.options.iter().map(|o| (*o).to_string()).collect(),
    correct_answer: def.correct_answer.to_string(),
    explanation: def.explanation.to_string(),
  }
}

fn compile_rule(exercise: &str, description: &str, pattern: &str) -> Option<CompiledRule> {
  match Regex::new(pattern) {
    Ok(regex) => Some(CompiledRule { description: description.to_string(), regex }),
    Err(e) => {
      error!(target: "exercise", %exercise, %pattern, error = %e, "Skipping rule: invalid pattern");
      None
    }
  }
}

/// Build a track from a TOML bank entry. Invalid entries are skipped with an
/// error log rather than failing startup, matching the config-bank policy.
pub fn track_from_cfg(cfg: &TrackCfg) -> Option<Track> {
  if cfg.id.trim().is_empty() {
    error!(target: "exercise", "Skipping bank track: empty id.");
    return None;
  }

  let mut exercises = Vec::new();
  for ex in &cfg.exercises {
    let kind = ex.kind.clone().unwrap_or_default();
    match kind {
      ExerciseKind::Coding => {
        let rules: Vec<CompiledRule> = ex
          .rules
          .iter()
          .filter_map(|r| compile_rule(&ex.title, &r.description, &r.pattern))
          .collect();
        if rules.is_empty() {
          error!(target: "exercise", track = %cfg.id, exercise = %ex.title, "Skipping bank exercise: no usable grading rules.");
          continue;
        }
        exercises.push(Exercise {
          title: ex.title.clone(),
          description: ex.description.clone(),
          kind,
          task: ex.task.clone(),
          initial_code: ex.initial_code.clone(),
          solution: ex.solution.clone(),
          hints: ex.hints.clone(),
          rules,
          question: String::new(),
          options: Vec::new(),
          correct_answer: String::new(),
          explanation: String::new(),
        });
      }
      ExerciseKind::MultipleChoice => {
        let answer_listed = ex.options.iter().any(|o| o == &ex.correct_answer);
        if ex.question.trim().is_empty() || ex.options.is_empty() || !answer_listed {
          error!(target: "exercise", track = %cfg.id, exercise = %ex.title, "Skipping bank exercise: incomplete multiple-choice definition.");
          continue;
        }
        exercises.push(Exercise {
          title: ex.title.clone(),
          description: ex.description.clone(),
          kind,
          task: String::new(),
          initial_code: String::new(),
          solution: String::new(),
          hints: Vec::new(),
          rules: Vec::new(),
          question: ex.question.clone(),
          options: ex.options.clone(),
          correct_answer: ex.correct_answer.clone(),
          explanation: ex.explanation.clone(),
        });
      }
    }
  }

  if exercises.is_empty() {
    error!(target: "exercise", track = %cfg.id, "Skipping bank track: no usable exercises.");
    return None;
  }

  Some(Track {
    id: cfg.id.clone(),
    title: cfg.title.clone(),
    language: cfg.language.clone(),
    source: TrackSource::ConfigBank,
    exercises,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grader::grade_code;

  #[test]
  fn builtin_tables_compile_completely() {
    let compiled = builtin_tracks();
    assert_eq!(compiled.len(), BUILTIN_TRACKS.len());
    for (def, track) in BUILTIN_TRACKS.iter().zip(&compiled) {
      for (ex_def, ex) in def.exercises.iter().zip(&track.exercises) {
        assert_eq!(
          ex_def.rules.len(),
          ex.rules.len(),
          "pattern failed to compile in {} / {}",
          def.id,
          ex_def.title
        );
      }
    }
  }

  #[test]
  fn builtin_track_ids_are_unique() {
    let tracks = builtin_tracks();
    for (i, a) in tracks.iter().enumerate() {
      for b in &tracks[i + 1..] {
        assert_ne!(a.id, b.id);
      }
    }
  }

  #[test]
  fn every_builtin_solution_passes_its_own_rules() {
    for track in builtin_tracks() {
      for ex in &track.exercises {
        if matches!(ex.kind, ExerciseKind::Coding) {
          assert!(!ex.rules.is_empty(), "{}/{} has no rules", track.id, ex.title);
          let outcome = grade_code(&ex.rules, &ex.solution);
          assert!(
            outcome.passed(),
            "{}/{} solution fails its own rules: {:?}",
            track.id,
            ex.title,
            outcome.failed_rules()
          );
        }
      }
    }
  }

  #[test]
  fn every_builtin_choice_answer_is_listed() {
    for track in builtin_tracks() {
      for ex in &track.exercises {
        if matches!(ex.kind, ExerciseKind::MultipleChoice) {
          assert!(ex.options.iter().any(|o| o == &ex.correct_answer));
          assert!(!ex.explanation.is_empty());
        }
      }
    }
  }

  #[test]
  fn bank_track_without_rules_is_rejected() {
    use crate::config::{ExerciseCfg, RuleCfg};
    let cfg = TrackCfg {
      id: "custom".into(),
      title: "Custom".into(),
      language: "html".into(),
      exercises: vec![ExerciseCfg {
        kind: None,
        title: "No rules".into(),
        description: String::new(),
        task: "Do something".into(),
        initial_code: String::new(),
        solution: String::new(),
        hints: vec![],
        rules: vec![RuleCfg { description: "broken".into(), pattern: "([unclosed".into() }],
        question: String::new(),
        options: vec![],
        correct_answer: String::new(),
        explanation: String::new(),
      }],
    };
    assert!(track_from_cfg(&cfg).is_none());
  }
}
