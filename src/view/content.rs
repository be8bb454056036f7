//! Main content area rendering (catalog pages, admin tables, upload form)

use ratatui::widgets::Padding;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};

use super::utils::{calculate_num_width, format_duration, render_scrollable_list, truncate_string};
use crate::model::{
    ActiveSection, AdminPage, AdminTab, Album, Artist, ContentState, ContentView, IndexPage,
    IndexSection, Track, UiState, UploadForm,
};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    current_track_id: Option<i64>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new(
                "Type in search and press Enter to find music\n\n\
                 Use Tab to navigate between sections\n\
                 Use ↑/↓ to select items\n\
                 Press Enter to open, 'h' for all keys",
            )
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
            frame.render_widget(content, area);
        }
        ContentView::Index(page) => {
            render_index_page(frame, area, " Home ", page, is_focused, current_track_id);
        }
        ContentView::SearchResults(page) => {
            render_index_page(frame, area, " Results ", page, is_focused, current_track_id);
        }
        ContentView::AllSongs {
            tracks,
            selected_index,
        } => {
            render_track_list(
                frame,
                area,
                " All Songs ".to_string(),
                tracks,
                *selected_index,
                is_focused,
                current_track_id,
            );
        }
        ContentView::ArtistDetail {
            artist,
            albums,
            selected_index,
        } => {
            render_artist_detail(frame, area, artist, albums, *selected_index, is_focused);
        }
        ContentView::AlbumDetail {
            album,
            artist_name,
            tracks,
            selected_index,
        } => {
            render_track_list(
                frame,
                area,
                format!(" {} — {} ", album.name, artist_name),
                tracks,
                *selected_index,
                is_focused,
                current_track_id,
            );
        }
        ContentView::AdminManage(page) => {
            render_admin_page(frame, area, page, is_focused);
        }
        ContentView::Upload(form) => {
            render_upload_form(frame, area, form, is_focused);
        }
    }
}

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn row_style(is_selected: bool, is_focused: bool) -> Style {
    if is_selected && is_focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_index_page(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    page: &IndexPage,
    is_focused: bool,
    current_track_id: Option<i64>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category tabs
            Constraint::Min(0),    // List
        ])
        .split(area);

    let tab_titles = [
        (IndexSection::Songs, format!(" Songs ({}) ", page.tracks.len())),
        (IndexSection::Albums, format!(" Albums ({}) ", page.albums.len())),
        (IndexSection::Artists, format!(" Artists ({}) ", page.artists.len())),
    ];
    let spans: Vec<Span> = tab_titles
        .iter()
        .map(|(section, text)| {
            if *section == page.section {
                Span::styled(
                    text.clone(),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(text.clone(), Style::default().fg(Color::White))
            }
        })
        .collect();

    let tabs = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(tabs, chunks[0]);

    match page.section {
        IndexSection::Songs => render_track_list(
            frame,
            chunks[1],
            String::new(),
            &page.tracks,
            page.track_index,
            is_focused,
            current_track_id,
        ),
        IndexSection::Albums => render_album_list(
            frame,
            chunks[1],
            &page.albums,
            page.album_index,
            is_focused,
        ),
        IndexSection::Artists => render_artist_list(
            frame,
            chunks[1],
            &page.artists,
            page.artist_index,
            is_focused,
        ),
    }
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    tracks: &[Track],
    selected_index: usize,
    is_focused: bool,
    current_track_id: Option<i64>,
) {
    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(tracks.len());
    let duration_width = 8;
    let remaining = content_width.saturating_sub(num_width + duration_width + 8);
    let title_width = (remaining * 55) / 100;
    let artist_width = remaining.saturating_sub(title_width);

    let items: Vec<ListItem> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if current_track_id == Some(track.id) {
                "▶"
            } else {
                " "
            };
            let duration = track
                .duration_secs
                .map(|s| format_duration(s as u64 * 1000))
                .unwrap_or_else(|| "-:--".to_string());
            let text = format!(
                " {:>num_width$}  {} {}  {}  {:>duration_width$}",
                i + 1,
                marker,
                truncate_string(&track.title, title_width),
                truncate_string(&track.artist_name, artist_width),
                duration,
            );
            ListItem::new(text).style(row_style(i == selected_index, is_focused))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_album_list(
    frame: &mut Frame,
    area: Rect,
    albums: &[Album],
    selected_index: usize,
    is_focused: bool,
) {
    let items: Vec<ListItem> = albums
        .iter()
        .enumerate()
        .map(|(i, album)| {
            ListItem::new(format!(" {}", album.name))
                .style(row_style(i == selected_index, is_focused))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_artist_list(
    frame: &mut Frame,
    area: Rect,
    artists: &[Artist],
    selected_index: usize,
    is_focused: bool,
) {
    let items: Vec<ListItem> = artists
        .iter()
        .enumerate()
        .map(|(i, artist)| {
            ListItem::new(format!(" {}", artist.name))
                .style(row_style(i == selected_index, is_focused))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_artist_detail(
    frame: &mut Frame,
    area: Rect,
    artist: &Artist,
    albums: &[Album],
    selected_index: usize,
    is_focused: bool,
) {
    let bio_height = if artist.biography.is_some() { 5 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(bio_height), Constraint::Min(0)])
        .split(area);

    if let Some(biography) = &artist.biography {
        let bio = Paragraph::new(biography.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", artist.name))
                    .padding(Padding::horizontal(1))
                    .border_style(border_style(is_focused)),
            );
        frame.render_widget(bio, chunks[0]);
    }

    let items: Vec<ListItem> = albums
        .iter()
        .enumerate()
        .map(|(i, album)| {
            ListItem::new(format!(" {}", album.name))
                .style(row_style(i == selected_index, is_focused))
        })
        .collect();

    let title = if artist.biography.is_some() {
        " Albums ".to_string()
    } else {
        format!(" {} — Albums ", artist.name)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, chunks[1], items, selected_index, block);
}

fn render_admin_page(frame: &mut Frame, area: Rect, page: &AdminPage, is_focused: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Entity tabs
            Constraint::Min(0),    // Rows
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    let spans: Vec<Span> = [
        AdminTab::Users,
        AdminTab::Artists,
        AdminTab::Albums,
        AdminTab::Songs,
    ]
    .iter()
    .map(|tab| {
        let text = format!(" {} ", tab.label());
        if *tab == page.tab {
            Span::styled(
                text,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(text, Style::default().fg(Color::White))
        }
    })
    .collect();

    let tabs = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Manage catalog (page {}) ", page.page + 1))
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(tabs, chunks[0]);

    let items: Vec<ListItem> = match page.tab {
        AdminTab::Users => page
            .users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let admin = if user.is_admin { " [admin]" } else { "" };
                ListItem::new(format!(" #{:<5} {}{}", user.user_id, user.username, admin))
                    .style(row_style(i == page.selected_index, is_focused))
            })
            .collect(),
        AdminTab::Artists => page
            .artists
            .iter()
            .enumerate()
            .map(|(i, artist)| {
                ListItem::new(format!(" #{:<5} {}", artist.artist_id, artist.name))
                    .style(row_style(i == page.selected_index, is_focused))
            })
            .collect(),
        AdminTab::Albums => page
            .albums
            .iter()
            .enumerate()
            .map(|(i, album)| {
                ListItem::new(format!(
                    " #{:<5} {} (artist {})",
                    album.album_id, album.name, album.artist_id
                ))
                .style(row_style(i == page.selected_index, is_focused))
            })
            .collect(),
        AdminTab::Songs => page
            .songs
            .iter()
            .enumerate()
            .map(|(i, song)| {
                ListItem::new(format!(
                    " #{:<5} {} (album {})",
                    song.song_id, song.name, song.album_id
                ))
                .style(row_style(i == page.selected_index, is_focused))
            })
            .collect(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, chunks[1], items, page.selected_index, block);

    let hints = Paragraph::new(" a: add  e: edit  Del: delete  ←/→: tab  PgUp/PgDn: page")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[2]);
}

fn render_upload_form(frame: &mut Frame, area: Rect, form: &UploadForm, is_focused: bool) {
    let fields = [
        ("Song name", &form.song_name),
        ("Album id", &form.album_id),
        ("Audio file (.mp3)", &form.audio_path),
        ("Cover file (.png, optional)", &form.cover_path),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (i, (label, value)) in fields.iter().enumerate() {
        let focused = i == form.focus && is_focused && !form.in_flight;
        let label_style = if focused {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>28}: ", label), label_style),
            Span::raw(format!("{}{}", value, cursor)),
        ]));
    }

    lines.push(Line::raw(""));
    if let Some(pct) = form.audio_progress {
        lines.push(Line::styled(
            format!("{:>28}: {}%", "Audio upload", pct),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(pct) = form.cover_progress {
        lines.push(Line::styled(
            format!("{:>28}: {}%", "Cover upload", pct),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(status) = &form.status {
        lines.push(Line::styled(
            format!("{:>28}: {}", "Status", status),
            Style::default().fg(Color::Cyan),
        ));
    }

    if !form.album_choices.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "  Known albums:",
            Style::default().fg(Color::DarkGray),
        ));
        for album in form.album_choices.iter().take(8) {
            lines.push(Line::styled(
                format!("    #{} {}", album.album_id, album.name),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let content = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Upload song ")
            .padding(Padding::horizontal(1))
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(content, area);
}
