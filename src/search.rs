//! Local-maximum search inside one spot cell.
//!
//! A [`SearchArea`] spreads a mesh of [`SearchField`]s over the region a
//! measure field's center may occupy. Every pass first merges fields that ran
//! into each other, then lets each remaining field climb one step uphill.
//! Fields that cannot improve are retired and compared against the best
//! position seen so far.
//!
//! Fields live in a flat arena and refer to their peers by index; retired
//! fields stay in place and are skipped by state.

use crate::log::debug;
use crate::sampler::RegionSampler;
use crate::shape::Shape;
use crate::types::{Point, Size};

// ============================================================================
// Direction
// ============================================================================

/// A step in the 8-neighbourhood, numbered row-major from the upper left.
/// [`Direction::None`] (4) is the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    UpLeft = 0,
    Up = 1,
    UpRight = 2,
    Left = 3,
    None = 4,
    Right = 5,
    DownLeft = 6,
    Down = 7,
    DownRight = 8,
}

impl Direction {
    /// All directions in probing order
    pub const ALL: [Direction; 9] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Left,
        Direction::None,
        Direction::Right,
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
    ];

    /// Unit offset `(dx, dy)`; y grows downwards
    pub fn offset(self) -> (f64, f64) {
        let i = self as i32;
        (f64::from(i % 3 - 1), f64::from(i / 3 - 1))
    }

    /// Directions not worth probing after moving in `self`: going back, or
    /// to a spot a neighbour of the previous position already rated.
    fn backtracks(self) -> &'static [Direction] {
        use Direction::*;
        match self {
            UpLeft => &[None, Right, Down, DownRight],
            Up => &[Left, None, Right, DownLeft, Down, DownRight],
            UpRight => &[Left, None, DownLeft, Down],
            Left => &[Up, UpRight, None, Right, Down, DownRight],
            Right => &[UpLeft, Up, Left, None, DownLeft, Down],
            DownLeft => &[Up, UpRight, None, Right],
            Down => &[UpLeft, Up, UpRight, Left, None, Right],
            DownRight => &[UpLeft, Up, Left, None],
            None => &[None],
        }
    }
}

// ============================================================================
// Search Field
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Active,
    /// Sitting on a local maximum
    Converged,
    /// Lost an intersection contest
    Removed,
}

/// Outcome of one hill-climbing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Climb {
    Moved(Direction),
    Converged,
}

/// One mobile candidate region
#[derive(Debug, Clone, PartialEq)]
pub struct SearchField {
    region: Shape,
    sample_radius: f64,
    last_move: Direction,
    value: f64,
    peers: Vec<usize>,
    state: FieldState,
}

impl SearchField {
    /// A field at `region` whose sampled value there is `value`
    pub fn new(region: Shape, sample_radius: f64, value: f64) -> Self {
        Self {
            region,
            sample_radius,
            last_move: Direction::None,
            value,
            peers: Vec::new(),
            state: FieldState::Active,
        }
    }

    pub fn region(&self) -> &Shape {
        &self.region
    }

    pub fn center(&self) -> Point {
        self.region.center()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn last_move(&self) -> Direction {
        self.last_move
    }

    /// Arena indices of linked fields
    pub fn peers(&self) -> &[usize] {
        &self.peers
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == FieldState::Active
    }

    /// Probe the neighbourhood `step` away and move to the best strictly
    /// better position, or mark the field converged if there is none.
    pub fn climb(&mut self, step: f64, mut probe: impl FnMut(Point) -> f64) -> Climb {
        let center = self.center();
        let skip = self.last_move.backtracks();

        let mut best = self.value;
        let mut best_dir = Direction::None;
        for dir in Direction::ALL {
            if skip.contains(&dir) {
                continue;
            }
            let (dx, dy) = dir.offset();
            let value = probe(center.shifted(dx * step, dy * step));
            if value > best {
                best = value;
                best_dir = dir;
            }
        }

        if best_dir == Direction::None {
            self.state = FieldState::Converged;
            return Climb::Converged;
        }

        let (dx, dy) = best_dir.offset();
        self.region.translate(dx * step, dy * step);
        self.value = best;
        self.last_move = best_dir;
        Climb::Moved(best_dir)
    }
}

// ============================================================================
// Search Area
// ============================================================================

/// How a fill ratio becomes a number of mesh points per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Population {
    /// Round down; never starts fields outside the perimeter
    #[default]
    Truncate,
    Round,
    /// Round up; denser meshes, more probes
    Ceil,
}

impl Population {
    pub fn count(self, ratio: f64) -> usize {
        let n = match self {
            Population::Truncate => ratio.trunc(),
            Population::Round => ratio.round(),
            Population::Ceil => ratio.ceil(),
        };
        n as usize
    }
}

/// Tuning knobs for the search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Probe distance in pixels
    pub step: f64,
    pub population: Population,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            step: 1.0,
            population: Population::Truncate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Best {
    center: Point,
    value: f64,
}

/// Samples the template region at arbitrary centers
struct Probe<'s, S: ?Sized> {
    sampler: &'s S,
    perimeter: Shape,
    template: Shape,
}

impl<S: RegionSampler + ?Sized> Probe<'_, S> {
    fn mean_at(&self, center: Point, respect_bounds: bool) -> f64 {
        if respect_bounds && !self.perimeter.contains_point(center) {
            return -1.0;
        }
        self.sampler.sample(&self.template.centered_at(center)).mean
    }
}

/// A mesh of search fields converging on the brightest spot of a perimeter
pub struct SearchArea<'s, S: ?Sized> {
    probe: Probe<'s, S>,
    radius: f64,
    step: f64,
    fields: Vec<SearchField>,
    rows: usize,
    cols: usize,
    best: Option<Best>,
    passes: usize,
}

impl<'s, S: RegionSampler + ?Sized> SearchArea<'s, S> {
    /// Populate `perimeter` with copies of `template`.
    ///
    /// The corners are interpolated top edge first (corner 0 to 1), bottom
    /// edge (3 to 2) with the same count, then every column from its top to
    /// its bottom point. `ratios` gives the spot cell to measure field size
    /// ratio per axis; an axis gets that many points when it is at least 3,
    /// otherwise just its two end points.
    pub fn new(
        sampler: &'s S,
        perimeter: Shape,
        template: Shape,
        radius: f64,
        ratios: Size,
        options: &SearchOptions,
    ) -> Self {
        let mut area = Self {
            probe: Probe {
                sampler,
                perimeter,
                template,
            },
            radius,
            step: options.step,
            fields: Vec::new(),
            rows: 0,
            cols: 0,
            best: None,
            passes: 0,
        };
        area.populate(
            options.population.count(ratios.w),
            options.population.count(ratios.h),
        );
        area.interlink();
        area
    }

    fn populate(&mut self, across: usize, down: usize) {
        let corners = self.probe.perimeter.points();
        let columns: Vec<Vec<Point>> = match corners[..] {
            [c0, c1, c2, c3] => {
                let top = populate_line(c0, c1, across);
                let bottom = populate_line(c3, c2, across);
                top.into_iter()
                    .zip(bottom)
                    .map(|(start, end)| populate_line(start, end, down))
                    .collect()
            }
            _ => vec![vec![self.probe.perimeter.center()]],
        };

        self.cols = columns.len();
        self.rows = columns.first().map_or(0, Vec::len);
        self.fields = columns
            .into_iter()
            .flatten()
            .map(|center| {
                let region = self.probe.template.centered_at(center);
                let value = self.probe.mean_at(center, false);
                SearchField::new(region, self.radius, value)
            })
            .collect();
    }

    /// Link each field to its neighbours below, right, down-right and
    /// down-left. Every neighbouring pair is linked exactly once.
    fn interlink(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        for i in 0..self.fields.len() {
            let last_row = (i + 1) % rows == 0;
            let col = i / rows;
            let peers = &mut self.fields[i].peers;
            if !last_row {
                peers.push(i + 1);
                if col > 0 {
                    peers.push(i - rows + 1);
                }
            }
            if col < cols - 1 {
                peers.push(i + rows);
                if !last_row {
                    peers.push(i + rows + 1);
                }
            }
        }
    }

    /// Mean under the template centered at `center`. With `respect_bounds`,
    /// centers outside the perimeter yield `-1`.
    pub fn measure_at(&self, center: Point, respect_bounds: bool) -> f64 {
        self.probe.mean_at(center, respect_bounds)
    }

    pub fn fields(&self) -> &[SearchField] {
        &self.fields
    }

    /// Mesh size as `(rows, cols)`; fields are stored column by column
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Full resolve-and-climb passes run by [`SearchArea::converge`]
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn active_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_active()).count()
    }

    /// Merge every active field with the active peers it overlaps. Only the
    /// brightest of each cluster survives and inherits the others' links.
    pub fn resolve_intersections(&mut self) {
        for i in 0..self.fields.len() {
            if self.fields[i].is_active() {
                self.resolve_at(i);
            }
        }
    }

    fn resolve_at(&mut self, i: usize) {
        let this = &self.fields[i];
        let intersecting: Vec<usize> = this
            .peers
            .iter()
            .copied()
            .filter(|&j| {
                let peer = &self.fields[j];
                peer.is_active() && this.region.intersects(&peer.region, this.sample_radius)
            })
            .collect();
        if intersecting.is_empty() {
            return;
        }

        let mut max = i;
        let mut second = i;
        for &j in &intersecting {
            let value = self.fields[j].value;
            if self.fields[max].value < value {
                second = max;
                max = j;
            } else if self.fields[second].value < value {
                second = j;
            }
        }

        let losers: Vec<usize> = std::iter::once(i)
            .filter(|_| max != i)
            .chain(intersecting.iter().copied().filter(|&j| j != max))
            .collect();

        if max != second {
            self.refine_between(max, second);
        }

        let mut inherited = Vec::new();
        for &loser in &losers {
            for &peer in &self.fields[loser].peers {
                if peer != max
                    && self.fields[peer].is_active()
                    && !losers.contains(&peer)
                    && !inherited.contains(&peer)
                {
                    inherited.push(peer);
                }
            }
        }

        let survivor = &mut self.fields[max];
        survivor.peers.retain(|p| !losers.contains(p));
        for peer in inherited {
            if !survivor.peers.contains(&peer) {
                survivor.peers.push(peer);
            }
        }
        for loser in losers {
            self.fields[loser].state = FieldState::Removed;
        }
    }

    /// Try the position halfway between the two best fields of a cluster
    fn refine_between(&mut self, max: usize, second: usize) {
        let Some(between) = self.fields[max]
            .region
            .average_with(&self.fields[second].region)
        else {
            return;
        };
        let value = self.probe.mean_at(between.center(), false);
        let field = &mut self.fields[max];
        if value > field.value {
            field.value = value;
            field.region = between;
            field.last_move = Direction::None;
        }
    }

    /// Let every active field climb one step. Converged fields are retired
    /// and replace the best position if strictly brighter.
    pub fn hill_climb_pass(&mut self) {
        for field in &mut self.fields {
            if !field.is_active() {
                continue;
            }
            let climb = field.climb(self.step, |p| self.probe.mean_at(p, true));
            if climb == Climb::Converged {
                let value = field.value;
                if self.best.is_none_or(|best| value > best.value) {
                    self.best = Some(Best {
                        center: field.center(),
                        value,
                    });
                }
            }
        }
    }

    /// Run until no field is active and return the brightest position found.
    /// `start` competes too, so a field only moves for a strict improvement.
    pub fn converge(&mut self, start: Point) -> Point {
        self.best = Some(Best {
            center: start,
            value: self.probe.mean_at(start, false),
        });

        while self.active_count() > 0 {
            self.resolve_intersections();
            self.hill_climb_pass();
            self.passes += 1;
        }

        let best = self.best.map_or(start, |best| best.center);
        debug!(
            fields = self.fields.len(),
            passes = self.passes,
            x = best.x,
            y = best.y,
            "search converged"
        );
        best
    }
}

/// `start`, then `n - 2` evenly spaced inner points for `n >= 3`, then `end`
fn populate_line(start: Point, end: Point, n: usize) -> Vec<Point> {
    let mut points = vec![start];
    if n >= 3 {
        let segments = n - 1;
        for i in 1..segments {
            points.push(start.lerp(end, i as f64 / segments as f64));
        }
    }
    points.push(end);
    points
}
