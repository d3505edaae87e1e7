use crate::ast::{
    BoxDecl, DetectorDecl, DetectorKind, RadiusDecl, Scene, SimulateDecl, SpawnDecl, SpawnKind,
};
use crate::diagnostics::Span;
use crate::engine::BoundaryPolicy;
use glam::DVec2;
use thiserror::Error;

/// Parse error with optional span information
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{message}")]
    SyntaxError {
        message: String,
        span: Option<Span>,
    },
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span: None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::SyntaxError { span, .. } => *span,
        }
    }
}

/// Helper to track byte offsets while parsing
struct ParseContext {
    line_offsets: Vec<usize>, // Byte offset of start of each line
    len: usize,
}

impl ParseContext {
    fn new(source: &str) -> Self {
        let mut line_offsets = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_offsets.push(offset + 1);
            }
        }
        Self {
            line_offsets,
            len: source.len(),
        }
    }

    fn line_start(&self, line: usize) -> usize {
        self.line_offsets.get(line).copied().unwrap_or(self.len)
    }

    /// Create a span for the entire line
    fn full_line_span(&self, line: usize) -> Span {
        Span::new(self.line_start(line), self.line_start(line + 1))
    }
}

/// Parse a scene description
pub fn parse_scene(source: &str) -> Result<Scene, ParseError> {
    let ctx = ParseContext::new(source);
    let mut bounds = None;
    let mut radius = None;
    let mut simulate = None;
    let mut boundary = None;
    let mut spawns = Vec::new();
    let mut detectors = Vec::new();

    for (i, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        let span = Some(ctx.full_line_span(i));

        if line.is_empty() {
            continue;
        }

        let keyword = line.split_whitespace().next().unwrap_or("");
        match keyword {
            "box" => set_once(&mut bounds, parse_box(line, span)?, "box", span)?,
            "radius" => set_once(&mut radius, parse_radius(line, span)?, "radius", span)?,
            "simulate" => set_once(&mut simulate, parse_simulate(line, span)?, "simulate", span)?,
            "boundary" => set_once(&mut boundary, parse_boundary(line, span)?, "boundary", span)?,
            "particle" => spawns.push(parse_particle(line, span)?),
            "scatter" => spawns.push(parse_scatter(line, span)?),
            "detect" => detectors.push(parse_detector(line, span)?),
            _ => {
                return Err(ParseError::new(
                    format!("Unexpected token: {}", keyword),
                    span,
                ));
            }
        }
    }

    let bounds = bounds.ok_or_else(|| ParseError::message("Missing 'box' declaration"))?;
    let radius = radius.ok_or_else(|| ParseError::message("Missing 'radius' declaration"))?;
    let simulate =
        simulate.ok_or_else(|| ParseError::message("Missing 'simulate' declaration"))?;

    Ok(Scene {
        bounds,
        radius,
        simulate,
        boundary: boundary.unwrap_or_default(),
        spawns,
        detectors,
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    keyword: &str,
    span: Option<Span>,
) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::new(
            format!("Duplicate '{}' declaration", keyword),
            span,
        ));
    }
    *slot = Some(value);
    Ok(())
}

/// Parse a box declaration: `box max_x max_y`
fn parse_box(line: &str, span: Option<Span>) -> Result<BoxDecl, ParseError> {
    let rest = line.strip_prefix("box").unwrap_or(line).trim();
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(ParseError::new(
            format!("Expected two extents in box declaration: {}", line),
            span,
        ));
    }
    let max_x = parse_number(parts[0], span)?;
    let max_y = parse_number(parts[1], span)?;
    Ok(BoxDecl {
        max: DVec2::new(max_x, max_y),
        span,
    })
}

/// Parse a radius declaration: `radius r`
fn parse_radius(line: &str, span: Option<Span>) -> Result<RadiusDecl, ParseError> {
    let rest = line.strip_prefix("radius").unwrap_or(line).trim();
    Ok(RadiusDecl {
        value: parse_number(rest, span)?,
        span,
    })
}

/// Parse a simulate declaration: `simulate dt = x frames = n`
fn parse_simulate(line: &str, span: Option<Span>) -> Result<SimulateDecl, ParseError> {
    let rest = line.strip_prefix("simulate").unwrap_or(line).trim();

    let after_dt = rest.strip_prefix("dt = ").ok_or_else(|| {
        ParseError::new(format!("Expected 'dt =' in simulate: {}", line), span)
    })?;
    let dt_end = after_dt.find(" frames = ").ok_or_else(|| {
        ParseError::new(format!("Expected 'frames =' in simulate: {}", line), span)
    })?;

    let dt = parse_number(after_dt[..dt_end].trim(), span)?;
    let frames_str = after_dt[dt_end + 10..].trim();
    let frames = frames_str.parse::<usize>().map_err(|_| {
        ParseError::new(
            format!("Expected a non-negative integer frame count, got '{}'", frames_str),
            span,
        )
    })?;

    Ok(SimulateDecl { dt, frames, span })
}

/// Parse a boundary policy: `boundary literal` or `boundary per_axis`
fn parse_boundary(line: &str, span: Option<Span>) -> Result<BoundaryPolicy, ParseError> {
    let rest = line.strip_prefix("boundary").unwrap_or(line).trim();
    match rest {
        "literal" => Ok(BoundaryPolicy::Literal),
        "per_axis" => Ok(BoundaryPolicy::PerAxis),
        other => Err(ParseError::new(
            format!("Unknown boundary policy: {}", other),
            span,
        )),
    }
}

/// Parse a particle declaration: `particle at (x, y) velocity (vx, vy)`
///
/// The velocity clause is optional and defaults to rest.
fn parse_particle(line: &str, span: Option<Span>) -> Result<SpawnDecl, ParseError> {
    let rest = line.strip_prefix("particle").unwrap_or(line).trim();
    let rest = rest.strip_prefix("at ").ok_or_else(|| {
        ParseError::new(format!("Expected 'at' in particle declaration: {}", line), span)
    })?;

    let (position, rest) = parse_vec2(rest, span)?;
    let rest = rest.trim();

    let velocity = if rest.is_empty() {
        DVec2::ZERO
    } else {
        let vel_str = rest.strip_prefix("velocity ").ok_or_else(|| {
            ParseError::new(
                format!("Expected 'velocity' after position: {}", line),
                span,
            )
        })?;
        let (velocity, trailing) = parse_vec2(vel_str, span)?;
        if !trailing.trim().is_empty() {
            return Err(ParseError::new(
                format!("Unexpected trailing input: {}", trailing.trim()),
                span,
            ));
        }
        velocity
    };

    Ok(SpawnDecl {
        kind: SpawnKind::Particle { position, velocity },
        span,
    })
}

/// Parse a scatter declaration: `scatter n speed s seed k`
fn parse_scatter(line: &str, span: Option<Span>) -> Result<SpawnDecl, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 6 || parts[2] != "speed" || parts[4] != "seed" {
        return Err(ParseError::new(
            format!("Expected 'scatter <count> speed <speed> seed <seed>': {}", line),
            span,
        ));
    }

    let count = parts[1].parse::<usize>().map_err(|_| {
        ParseError::new(format!("Invalid particle count: {}", parts[1]), span)
    })?;
    let speed = parse_number(parts[3], span)?;
    let seed = parts[5]
        .parse::<u64>()
        .map_err(|_| ParseError::new(format!("Invalid seed: {}", parts[5]), span))?;

    Ok(SpawnDecl {
        kind: SpawnKind::Scatter { count, speed, seed },
        span,
    })
}

/// Parse a detector declaration: `detect name = energy`, `detect name = position(3).x`, ...
fn parse_detector(line: &str, span: Option<Span>) -> Result<DetectorDecl, ParseError> {
    let rest = line.strip_prefix("detect").unwrap_or(line).trim();

    let eq_pos = rest.find(" = ").ok_or_else(|| {
        ParseError::new(format!("Expected '=' in detector: {}", line), span)
    })?;

    let name = rest[..eq_pos].trim().to_string();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ParseError::new(
            format!("Invalid detector name: '{}'", name),
            span,
        ));
    }
    let expr = rest[eq_pos + 3..].trim();

    let kind = match expr {
        "energy" => DetectorKind::Energy,
        "momentum.x" => DetectorKind::MomentumX,
        "momentum.y" => DetectorKind::MomentumY,
        "collisions" => DetectorKind::Collisions,
        "reflections" => DetectorKind::Reflections,
        _ if expr.starts_with("position(") => {
            let (index, suffix) = parse_index_call(expr, "position(", span)?;
            match suffix {
                ".x" => DetectorKind::PositionX(index),
                ".y" => DetectorKind::PositionY(index),
                _ => {
                    return Err(ParseError::new(
                        format!("Expected '.x' or '.y' after position(...): {}", line),
                        span,
                    ));
                }
            }
        }
        _ if expr.starts_with("speed(") => {
            let (index, suffix) = parse_index_call(expr, "speed(", span)?;
            if !suffix.is_empty() {
                return Err(ParseError::new(
                    format!("Unexpected trailing input: {}", suffix),
                    span,
                ));
            }
            DetectorKind::Speed(index)
        }
        _ => {
            return Err(ParseError::new(
                format!("Unknown detector type: {}", expr),
                span,
            ));
        }
    };

    Ok(DetectorDecl { name, kind, span })
}

/// Parse `prefix<index>)rest` and return the index with whatever follows the `)`
fn parse_index_call<'a>(
    expr: &'a str,
    prefix: &str,
    span: Option<Span>,
) -> Result<(usize, &'a str), ParseError> {
    let inner = &expr[prefix.len()..];
    let end = inner.find(')').ok_or_else(|| {
        ParseError::new(format!("Expected ')' in detector: {}", expr), span)
    })?;
    let index_str = inner[..end].trim();
    let index = index_str.parse::<usize>().map_err(|_| {
        ParseError::new(format!("Invalid particle index: {}", index_str), span)
    })?;
    Ok((index, &inner[end + 1..]))
}

/// Parse `(x, y)` from the start of `s`, returning the vector and the remaining input
fn parse_vec2(s: &str, span: Option<Span>) -> Result<(DVec2, &str), ParseError> {
    let s = s.trim_start();
    let inner = s.strip_prefix('(').ok_or_else(|| {
        ParseError::new(format!("Expected '(' in vector: {}", s), span)
    })?;
    let end = inner.find(')').ok_or_else(|| {
        ParseError::new(format!("Expected ')' in vector: {}", s), span)
    })?;

    let coords: Vec<&str> = inner[..end].split(',').map(|c| c.trim()).collect();
    if coords.len() != 2 {
        return Err(ParseError::new(
            format!("Expected two components in vector: {}", s),
            span,
        ));
    }

    let x = parse_number(coords[0], span)?;
    let y = parse_number(coords[1], span)?;
    Ok((DVec2::new(x, y), &inner[end + 1..]))
}

fn parse_number(s: &str, span: Option<Span>) -> Result<f64, ParseError> {
    s.parse::<f64>()
        .map_err(|_| ParseError::new(format!("Invalid number: '{}'", s), span))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "box 10 8\nradius 0.5\nsimulate dt = 0.01 frames = 100\n";

    #[test]
    fn test_minimal_scene() {
        let scene = parse_scene(MINIMAL).unwrap();
        assert_eq!(scene.bounds.max, DVec2::new(10.0, 8.0));
        assert_eq!(scene.radius.value, 0.5);
        assert_eq!(scene.simulate.dt, 0.01);
        assert_eq!(scene.simulate.frames, 100);
        assert_eq!(scene.boundary, BoundaryPolicy::Literal);
        assert!(scene.spawns.is_empty());
    }

    #[test]
    fn test_particle_velocity_optional() {
        let src = format!(
            "{}particle at (1.0, 2.0) velocity (0.5, -0.25)\nparticle at (3, 4)\n",
            MINIMAL
        );
        let scene = parse_scene(&src).unwrap();
        assert_eq!(scene.spawns.len(), 2);
        match scene.spawns[0].kind {
            SpawnKind::Particle { position, velocity } => {
                assert_eq!(position, DVec2::new(1.0, 2.0));
                assert_eq!(velocity, DVec2::new(0.5, -0.25));
            }
            _ => panic!("expected particle"),
        }
        match scene.spawns[1].kind {
            SpawnKind::Particle { velocity, .. } => assert_eq!(velocity, DVec2::ZERO),
            _ => panic!("expected particle"),
        }
    }

    #[test]
    fn test_scatter_and_boundary() {
        let src = format!("{}boundary per_axis\nscatter 20 speed 1.5 seed 42\n", MINIMAL);
        let scene = parse_scene(&src).unwrap();
        assert_eq!(scene.boundary, BoundaryPolicy::PerAxis);
        assert_eq!(scene.requested_particles(), 20);
        match scene.spawns[0].kind {
            SpawnKind::Scatter { count, speed, seed } => {
                assert_eq!((count, seed), (20, 42));
                assert_eq!(speed, 1.5);
            }
            _ => panic!("expected scatter"),
        }
    }

    #[test]
    fn test_detectors() {
        let src = format!(
            "{}detect e = energy\ndetect px = momentum.x\ndetect x3 = position(3).x\ndetect s0 = speed(0)\ndetect hits = collisions\n",
            MINIMAL
        );
        let scene = parse_scene(&src).unwrap();
        let kinds: Vec<_> = scene.detectors.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DetectorKind::Energy,
                DetectorKind::MomentumX,
                DetectorKind::PositionX(3),
                DetectorKind::Speed(0),
                DetectorKind::Collisions,
            ]
        );
        assert_eq!(scene.detectors[2].name, "x3");
    }

    #[test]
    fn test_comments_ignored() {
        let src = "# a scene\nbox 10 10 # extents\nradius 1\n\nsimulate dt = 0.1 frames = 5\n";
        assert!(parse_scene(src).is_ok());
    }

    #[test]
    fn test_missing_simulate() {
        let err = parse_scene("box 10 10\nradius 1\n").unwrap_err();
        assert!(err.to_string().contains("simulate"));
    }

    #[test]
    fn test_duplicate_radius_has_span() {
        let src = format!("{}radius 2\n", MINIMAL);
        let err = parse_scene(&src).unwrap_err();
        assert!(err.to_string().contains("Duplicate 'radius'"));
        let span = err.span().unwrap();
        assert_eq!(&src[span.start..span.end], "radius 2\n");
    }

    #[test]
    fn test_unknown_keyword() {
        let src = format!("{}wall 1 2\n", MINIMAL);
        let err = parse_scene(&src).unwrap_err();
        assert!(err.to_string().contains("Unexpected token: wall"));
    }

    #[test]
    fn test_negative_frames_rejected() {
        let err = parse_scene("box 10 10\nradius 1\nsimulate dt = 0.1 frames = -3\n").unwrap_err();
        assert!(err.to_string().contains("frame count"));
    }
}
