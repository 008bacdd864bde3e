use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        block::Title, Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Wrap,
    },
};

use crate::app::{App, GenerationState};

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

fn keyword_style() -> Style {
    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
}

fn string_style() -> Style {
    Style::default().fg(Color::Green)
}

fn comment_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

/// Style one line of Python source: comments, string literals, and
/// keywords get distinct colors, everything else renders raw. Purely a
/// function of the text; the code itself is never modified.
fn highlight_python_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                if !current.is_empty() {
                    push_word_spans(&mut spans, std::mem::take(&mut current));
                }
                let mut comment = String::from('#');
                comment.extend(chars.by_ref());
                spans.push(Span::styled(comment, comment_style()));
            }
            '"' | '\'' => {
                if !current.is_empty() {
                    push_word_spans(&mut spans, std::mem::take(&mut current));
                }
                let quote = c;
                let mut literal = String::from(c);
                let mut escaped = false;
                for sc in chars.by_ref() {
                    literal.push(sc);
                    if escaped {
                        escaped = false;
                    } else if sc == '\\' {
                        escaped = true;
                    } else if sc == quote {
                        break;
                    }
                }
                spans.push(Span::styled(literal, string_style()));
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        push_word_spans(&mut spans, current);
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Split a code fragment into words, styling the Python keywords.
fn push_word_spans(spans: &mut Vec<Span<'static>>, text: String) {
    let mut plain = String::new();
    let mut word = String::new();

    let mut flush_word = |plain: &mut String, word: &mut String, spans: &mut Vec<Span<'static>>| {
        if word.is_empty() {
            return;
        }
        if PYTHON_KEYWORDS.contains(&word.as_str()) {
            if !plain.is_empty() {
                spans.push(Span::raw(std::mem::take(plain)));
            }
            spans.push(Span::styled(std::mem::take(word), keyword_style()));
        } else {
            plain.push_str(word);
            word.clear();
        }
    };

    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
        } else {
            flush_word(&mut plain, &mut word, spans);
            plain.push(c);
        }
    }
    flush_word(&mut plain, &mut word, spans);

    if !plain.is_empty() {
        spans.push(Span::raw(plain));
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    // Hit-test areas are re-recorded on every draw; anything not drawn
    // this frame is not clickable.
    app.generate_button_area = None;
    app.copy_button_area = None;
    app.code_area = None;

    match app.state {
        GenerationState::Idle => render_idle(app, frame, body_area),
        GenerationState::Loading => render_loading(app, frame, body_area),
        GenerationState::Error(_) => render_error(app, frame, body_area),
        GenerationState::Ready(_) => render_result(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Falling Sand Code Generator ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            "pygame scripts via Gemini ",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_idle(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, intro_area, button_area, _] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let intro = Paragraph::new(vec![
        Line::from("Generate a complete, ready-to-run Python script for a"),
        Line::from("'falling sand' particle physics simulation built on pygame."),
        Line::default(),
        Line::styled(
            "Sand falls, water flows, stone blocks, wood floats.",
            Style::default().fg(Color::Gray),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(intro, intro_area);

    app.generate_button_area = Some(render_button(
        frame,
        button_area,
        " ▶ Generate Code ",
        Style::default().bg(Color::Blue).fg(Color::White).bold(),
    ));
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, spinner_area, _] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(inner);

    let dots = ".".repeat(app.spinner_frame as usize + 1);
    let spinner = Paragraph::new(vec![
        Line::styled(
            format!("Generating code{dots}"),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Line::styled(
            "This usually takes a few seconds.",
            Style::default().fg(Color::Gray),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(spinner, spinner_area);
}

fn render_error(app: &mut App, frame: &mut Frame, area: Rect) {
    let message = match &app.state {
        GenerationState::Error(message) => message.clone(),
        _ => return,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Something went wrong ",
            Style::default().fg(Color::Red).bold(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, message_area, button_area, _] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let banner = Paragraph::new(Line::styled(message, Style::default().fg(Color::Red)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, message_area);

    app.generate_button_area = Some(render_button(
        frame,
        button_area,
        " ↻ Try Again ",
        Style::default().bg(Color::Red).fg(Color::White).bold(),
    ));
}

fn render_result(app: &mut App, frame: &mut Frame, area: Rect) {
    let [code_area, help_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(8)]).areas(area);

    render_code_block(app, frame, code_area);
    render_run_instructions(frame, help_area);
}

fn render_code_block(app: &mut App, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = match &app.state {
        GenerationState::Ready(code) => code.lines().map(highlight_python_line).collect(),
        _ => return,
    };

    let (copy_label, copy_style) = if app.copied {
        (
            " ✓ Copied! ",
            Style::default().bg(Color::Green).fg(Color::Black).bold(),
        )
    } else {
        (
            " c copy ",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " simulation.py ",
            Style::default().fg(Color::Cyan),
        ))
        .title(Title::from(Span::styled(copy_label, copy_style)).alignment(Alignment::Right));

    let inner = block.inner(area);
    app.code_area = Some(inner);
    app.code_height = inner.height;
    app.total_code_lines = lines.len() as u16;

    // The copy control sits in the top border, right-aligned
    let label_width = copy_label.chars().count() as u16;
    let label_x = area
        .right()
        .saturating_sub(1)
        .saturating_sub(label_width)
        .max(area.x);
    app.copy_button_area = Some(Rect::new(label_x, area.y, label_width, 1));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.code_scroll, 0));
    frame.render_widget(paragraph, area);

    if app.total_code_lines > app.code_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state = ScrollbarState::new(
            app.total_code_lines.saturating_sub(app.code_height) as usize,
        )
        .position(app.code_scroll as usize);
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_run_instructions(frame: &mut Frame, area: Rect) {
    let step_style = Style::default().fg(Color::Yellow).bold();
    let command_style = Style::default().fg(Color::Cyan);

    let lines = vec![
        Line::from(vec![
            Span::styled("1. ", step_style),
            Span::raw("Make sure Python 3 is installed: "),
            Span::styled("python3 --version", command_style),
        ]),
        Line::from(vec![
            Span::styled("2. ", step_style),
            Span::raw("Install the pygame library: "),
            Span::styled("pip install pygame", command_style),
        ]),
        Line::from(vec![
            Span::styled("3. ", step_style),
            Span::raw("Copy the code above and save it as "),
            Span::styled("simulation.py", command_style),
        ]),
        Line::from(vec![
            Span::styled("4. ", step_style),
            Span::raw("Run it from that directory: "),
            Span::styled("python3 simulation.py", command_style),
        ]),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " How to run ",
                Style::default().fg(Color::Cyan),
            )),
    );
    frame.render_widget(help, area);
}

/// Draw a centered one-line button and return its hit-test rectangle.
fn render_button(frame: &mut Frame, area: Rect, label: &str, style: Style) -> Rect {
    let width = (label.chars().count() as u16).min(area.width);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let rect = Rect::new(x, area.y, width, 1);

    let button = Paragraph::new(Span::styled(label.to_string(), style));
    frame.render_widget(button, rect);
    rect
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.state {
        GenerationState::Idle => (" IDLE ", Style::default().bg(Color::Blue).fg(Color::White)),
        GenerationState::Loading => (
            " WORKING ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        GenerationState::Error(_) => (
            " ERROR ",
            Style::default().bg(Color::Red).fg(Color::White),
        ),
        GenerationState::Ready(_) => (
            " READY ",
            Style::default().bg(Color::Green).fg(Color::Black),
        ),
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.state {
        GenerationState::Idle => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" generate ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        GenerationState::Loading => vec![
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        GenerationState::Error(_) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" retry ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        GenerationState::Ready(_) => vec![
            Span::styled(" c ", key_style),
            Span::styled(" copy ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" regenerate ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn highlighting_never_changes_the_text() {
        let source = "def update(grid):  # bottom-up scan\n    return \"done\"";
        for line in source.lines() {
            assert_eq!(line_text(&highlight_python_line(line)), line);
        }
    }

    #[test]
    fn keywords_are_styled() {
        let line = highlight_python_line("def main():");
        let keyword = line
            .spans
            .iter()
            .find(|s| s.content == "def")
            .expect("keyword span");
        assert_eq!(keyword.style, keyword_style());
    }

    #[test]
    fn keyword_fragments_inside_identifiers_are_not_styled() {
        let line = highlight_python_line("definition = 1");
        assert!(line.spans.iter().all(|s| s.style != keyword_style()));
    }

    #[test]
    fn comments_swallow_the_rest_of_the_line() {
        let line = highlight_python_line("x = 1  # if while def");
        let comment = line.spans.last().expect("comment span");
        assert_eq!(comment.content, "# if while def");
        assert_eq!(comment.style, comment_style());
    }

    #[test]
    fn string_literals_are_styled_and_keep_escapes() {
        let line = highlight_python_line(r#"label = "sand \"wet\" pile""#);
        let literal = line
            .spans
            .iter()
            .find(|s| s.style == string_style())
            .expect("string span");
        assert_eq!(literal.content, r#""sand \"wet\" pile""#);
    }

    #[test]
    fn empty_line_renders_empty() {
        assert!(highlight_python_line("").spans.is_empty());
    }
}
