//! Plain-text reports printed by the commands.

use std::io::{self, Write};

use fieldmark_core::{
    BeforeImage, ContextSnapshot, ImageBank, ImageBankEntry, IssueTag, LayerKind, PointOfInterest,
    SolutionId,
};

/// Heading of the proximity line for `kind`.
const fn proximity_label(kind: LayerKind) -> &'static str {
    match kind {
        LayerKind::Green => "Near green",
        LayerKind::Water => "Near water",
        LayerKind::Cycling => "Near cycle route",
        LayerKind::Roads => "Near road",
    }
}

/// Format a proximity flag as `yes (N m)` or `no`.
fn proximity_value(snapshot: &ContextSnapshot, kind: LayerKind) -> String {
    match snapshot.distance_m(kind) {
        Some(meters) if snapshot.is_near(kind) => format!("yes ({meters} m)"),
        _ => "no".to_owned(),
    }
}

/// Write the context panel lines.
pub(crate) fn write_context(writer: &mut dyn Write, snapshot: &ContextSnapshot) -> io::Result<()> {
    writeln!(writer, "Land-use/type: {}", snapshot.land_type)?;
    for kind in LayerKind::ALL {
        writeln!(
            writer,
            "{}: {}",
            proximity_label(kind),
            proximity_value(snapshot, kind)
        )?;
    }
    Ok(())
}

fn before_summary(before: Option<&BeforeImage>) -> String {
    match before {
        Some(BeforeImage::Remote(url)) => url.clone(),
        Some(BeforeImage::Embedded(data_url)) => {
            format!("embedded image ({} bytes encoded)", data_url.len())
        }
        None => "none".to_owned(),
    }
}

/// Write the POI record followed by its cached context.
pub(crate) fn write_poi(
    writer: &mut dyn Write,
    poi: &PointOfInterest,
    bank: &ImageBank,
) -> io::Result<()> {
    writeln!(writer, "{}", poi.id)?;
    writeln!(writer, "Title: {}", poi.title)?;
    writeln!(writer, "Location: {:.6}, {:.6}", poi.lat, poi.lng)?;
    writeln!(writer, "Category: {}", poi.category.label())?;
    writeln!(writer, "Urgency: {}", poi.urgency)?;
    let tags: Vec<&str> = poi.tags.iter().copied().map(IssueTag::label).collect();
    if tags.is_empty() {
        writeln!(writer, "Tags: none")?;
    } else {
        writeln!(writer, "Tags: {}", tags.join(", "))?;
    }
    writeln!(writer, "Comment: {}", poi.comment)?;
    writeln!(writer, "Before: {}", before_summary(poi.before.as_ref()))?;
    writeln!(
        writer,
        "Solution: {}",
        poi.solution.map_or("none", SolutionId::label)
    )?;
    writeln!(writer, "Solution note: {}", poi.solution_note)?;
    match poi.after_image_id.as_deref() {
        Some(id) => match bank.get(id) {
            Some(entry) => writeln!(writer, "After image: {} ({id})", entry.title)?,
            None => writeln!(writer, "After image: {id}")?,
        },
        None => writeln!(writer, "After image: none")?,
    }
    writeln!(writer, "Created: {}", poi.created_at.to_rfc3339())?;
    if let Some(snapshot) = &poi.context {
        write_context(writer, snapshot)?;
    }
    Ok(())
}

/// Write the ranked after-image suggestions, marking the selected entry.
pub(crate) fn write_suggestions(
    writer: &mut dyn Write,
    suggestions: &[&ImageBankEntry],
    selected: Option<&str>,
) -> io::Result<()> {
    if suggestions.is_empty() {
        return writeln!(writer, "Suggested after images: none");
    }
    writeln!(writer, "Suggested after images:")?;
    for entry in suggestions {
        let marker = if selected == Some(entry.id.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(writer, "{marker} {}  {}  {}", entry.id, entry.title, entry.url)?;
    }
    Ok(())
}

/// Write one summary line for a POI.
pub(crate) fn write_summary(writer: &mut dyn Write, poi: &PointOfInterest) -> io::Result<()> {
    let title = if poi.title.is_empty() {
        "(untitled)"
    } else {
        poi.title.as_str()
    };
    writeln!(
        writer,
        "{}  {:.5},{:.5}  {}  {}  {title}",
        poi.id,
        poi.lat,
        poi.lng,
        poi.category,
        poi.urgency
    )
}
