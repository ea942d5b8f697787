//! Terminal "surface" that echoes list commands and prints row snapshots.

use std::sync::Mutex;

use crossterm::style::Stylize;
use foldlist::{ListSurface, ProxyRow, RowAnimation, RowIndex};

use crate::DemoList;

#[derive(Default)]
pub struct Screen {
    header: Mutex<Option<String>>,
    footer: Mutex<Option<String>>,
}

impl Screen {
    pub fn new(header: &str, footer: &str) -> Self {
        Self {
            header: Mutex::new(Some(header.to_string())),
            footer: Mutex::new(Some(footer.to_string())),
        }
    }

    fn echo(&self, what: &str, rows: &[RowIndex], animation: RowAnimation) {
        let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
        log::debug!("{} [{}] {:?}", what, rows.join(", "), animation);
        println!(
            "  {}",
            format!("· {} {} ({:?})", what, rows.join(", "), animation).dark_grey()
        );
    }

    /// Print every physical row of the list.
    pub fn render(&self, list: &DemoList) {
        if let Some(header) = self.header_view() {
            println!("{}", header.underlined());
        }
        for section in 0..list.number_of_sections() {
            for row in 0..list.number_of_rows(section) {
                match list.row_at(RowIndex::new(section, row)) {
                    Some(ProxyRow::Trigger(header)) => println!("{}", header),
                    Some(ProxyRow::Row(text)) => println!("    {}", text),
                    None => {}
                }
            }
        }
        if let Some(footer) = self.footer_view() {
            println!("{}", footer.dark_grey());
        }
    }
}

impl ListSurface for Screen {
    type View = String;

    fn insert_rows(&self, rows: &[RowIndex], animation: RowAnimation) {
        self.echo("insert", rows, animation);
    }

    fn delete_rows(&self, rows: &[RowIndex], animation: RowAnimation) {
        self.echo("delete", rows, animation);
    }

    fn reload_rows(&self, rows: &[RowIndex], animation: RowAnimation) {
        self.echo("reload", rows, animation);
    }

    fn reload_section(&self, section: usize, animation: RowAnimation) {
        log::debug!("reload section {} {:?}", section, animation);
        println!("  {}", format!("· reload section {}", section).dark_grey());
    }

    fn reload_data(&self) {
        log::debug!("reload data");
    }

    fn header_view(&self) -> Option<String> {
        self.header.lock().ok().and_then(|h| h.clone())
    }

    fn set_header_view(&self, view: Option<String>) {
        if let Ok(mut guard) = self.header.lock() {
            *guard = view;
        }
    }

    fn footer_view(&self) -> Option<String> {
        self.footer.lock().ok().and_then(|f| f.clone())
    }

    fn set_footer_view(&self, view: Option<String>) {
        if let Ok(mut guard) = self.footer.lock() {
            *guard = view;
        }
    }
}
