use crate::conversation::{Message, Sender};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Renders one conversation entry as a bordered bubble: a header line with
/// the timestamp and sender icon, the wrapped body, and a footer.
pub struct MessageBubble<'a> {
    message: &'a Message,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    pub fn render(&self, area: Rect) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let style = self.base_style();

        self.render_header(&mut lines, style);
        self.render_body(&mut lines, area, style);
        self.render_footer(&mut lines, style);

        lines
    }

    fn base_style(&self) -> Style {
        match self.message.sender {
            Sender::User => Style::default().fg(Color::Rgb(255, 223, 128)),
            Sender::Bot => Style::default().fg(Color::Rgb(144, 238, 144)),
            Sender::SystemError => Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
        }
    }

    // User bubbles are nudged right, everything else sits flush left
    fn indent(&self) -> &'static str {
        if self.message.sender == Sender::User {
            "  "
        } else {
            ""
        }
    }

    fn icon(&self) -> &'static str {
        match self.message.sender {
            Sender::User => "you",
            Sender::Bot => "fei",
            Sender::SystemError => "✗",
        }
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let timestamp = self.message.timestamp.format("%H:%M").to_string();

        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("┌─".to_string(), style),
            Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
            Span::styled(" ".to_string(), style),
            Span::styled(self.icon().to_string(), style),
        ]));
    }

    fn render_body(&self, lines: &mut Vec<Line<'static>>, area: Rect, style: Style) {
        let wrap_width = (area.width as usize).saturating_sub(4).max(1);

        for paragraph in self.message.text.lines() {
            if paragraph.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled(self.indent().to_string(), style),
                    Span::styled("│".to_string(), style),
                ]));
                continue;
            }
            for wrapped_line in wrap(paragraph, wrap_width) {
                lines.push(Line::from(vec![
                    Span::styled(self.indent().to_string(), style),
                    Span::styled("│ ".to_string(), style),
                    Span::styled(wrapped_line.to_string(), style),
                ]));
            }
        }
    }

    fn render_footer(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("╰─".to_string(), style),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;

    #[test]
    fn bubble_has_header_body_and_footer() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello there");
        let message = conversation.messages().last().unwrap();

        let area = Rect::new(0, 0, 40, 10);
        let lines = MessageBubble::new(message).render(area);

        // header + one body line + footer
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn long_body_wraps_to_area_width() {
        let mut conversation = Conversation::new();
        conversation.push_user(&"word ".repeat(30));
        let message = conversation.messages().last().unwrap();

        let area = Rect::new(0, 0, 20, 10);
        let lines = MessageBubble::new(message).render(area);
        assert!(lines.len() > 3);
    }
}
