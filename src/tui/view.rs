use crate::awards::{has_valid_contact, AwardRecord};
use crate::record::OutreachRecord;
use crate::review::{ExploreState, ReviewState};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

const REVIEW_KEYS: &str = "j/k move  a approve  s skip  e edit  q quit";
const EXPLORE_KEYS: &str = "j/k move  s/enter stage  q quit";

fn split(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);
    (columns[0], columns[1], rows[1])
}

fn footer<'a>(keys: &'a str, message: Option<&'a str>) -> Paragraph<'a> {
    let mut spans = vec![Span::styled(keys, Style::default().fg(Color::DarkGray))];
    if let Some(message) = message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message, Style::default().fg(Color::Yellow)));
    }
    Paragraph::new(Line::from(spans))
}

fn highlighted() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

fn labeled<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

pub(super) fn draw_review(frame: &mut Frame, state: &ReviewState, record: Option<&OutreachRecord>) {
    let (list_area, detail_area, footer_area) = split(frame.area());

    let items: Vec<ListItem> = state
        .ids
        .iter()
        .map(|id| ListItem::new(id.as_str()))
        .collect();
    let title = format!("{} ({})", state.collection, state.ids.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(highlighted());
    let mut list_state = ListState::default().with_selected(state.current().map(|_| state.index));
    frame.render_stateful_widget(list, list_area, &mut list_state);

    let lines = match record {
        Some(record) => {
            let mut lines = vec![
                labeled("To: ", format!("{} <{}>", record.pi_name, record.pi_email)),
                labeled("Institution: ", record.institution.clone()),
                labeled("Award: ", format!("{} (${})", record.award_title, record.award_amount)),
                labeled(
                    "Variant: ",
                    format!(
                        "{} / {} / {}",
                        record.variant_selection.template_id,
                        record.variant_selection.description_id,
                        record.variant_selection.cta_id
                    ),
                ),
                labeled("Subject: ", record.subject.clone()),
                Line::raw(""),
            ];
            lines.extend(record.body.lines().map(|line| Line::raw(line.to_string())));
            lines
        }
        None if state.is_empty() => vec![Line::raw(format!("no records in {}", state.collection))],
        None => vec![Line::raw("record unavailable")],
    };
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Email"))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, detail_area);

    frame.render_widget(footer(REVIEW_KEYS, state.message.as_deref()), footer_area);
}

pub(super) fn draw_explore(frame: &mut Frame, state: &ExploreState, award: Option<&AwardRecord>) {
    let (list_area, detail_area, footer_area) = split(frame.area());

    let items: Vec<ListItem> = state
        .ids
        .iter()
        .map(|id| {
            let marker = if state.staged.contains(id) { "* " } else { "  " };
            ListItem::new(format!("{marker}{id}"))
        })
        .collect();
    let title = format!("awards ({}, {} staged)", state.ids.len(), state.staged.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(highlighted());
    let mut list_state = ListState::default().with_selected(state.current().map(|_| state.index));
    frame.render_stateful_widget(list, list_area, &mut list_state);

    let lines = match award {
        Some(award) => {
            let contact = if has_valid_contact(award) {
                award.pi_email.clone()
            } else {
                "(no valid email)".to_string()
            };
            vec![
                labeled("Title: ", award.title.clone()),
                labeled("PI: ", format!("{} <{contact}>", award.pi_name)),
                labeled("Institution: ", award.institution.clone()),
                labeled("Amount: ", award.amount.clone()),
                labeled("Program: ", award.program.clone().unwrap_or_default()),
                Line::raw(""),
                Line::raw(award.abstract_text.clone()),
            ]
        }
        None => vec![Line::raw("no unprocessed awards")],
    };
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Award"))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, detail_area);

    frame.render_widget(footer(EXPLORE_KEYS, state.message.as_deref()), footer_area);
}
