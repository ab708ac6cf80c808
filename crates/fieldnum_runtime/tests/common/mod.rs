//! In-process stand-in for a foreign field runtime: the quadratic fields
//! Q(sqrt d) living on a small mark-and-sweep heap.
//!
//! Objects are rooted by protect counts. With `set_collect_on_alloc(true)`
//! every allocation first sweeps all unrooted objects, so any handle the host
//! keeps without protecting it is freed at the next foreign call. Slots are
//! never reused, which keeps stale handles detectable.

#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{CString, c_char, c_void};
use std::rc::Rc;

use fieldnum_runtime::{
    FieldDescriptor, FieldId, FieldRegistry, ForeignHandle, RawBigInt, RawFieldTable,
};
use hashbrown::HashMap;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

#[derive(Clone, Debug)]
struct Surd {
    field: i64,
    d: i64,
    a: BigRational,
    b: BigRational,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub allocations: usize,
    pub collections: usize,
    pub freed: usize,
    pub protects: usize,
    pub releases: usize,
    pub double_releases: usize,
    pub use_after_free: usize,
}

struct Heap {
    objects: Vec<Option<Surd>>,
    roots: Vec<u32>,
    fields: HashMap<i64, i64>,
    collect_on_alloc: bool,
    null_strings: bool,
    stats: Stats,
    text: CString,
}

thread_local! {
    static HEAP: RefCell<Heap> = RefCell::new(Heap::new());
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(n.into())
}

fn handle_of(index: usize) -> *mut c_void {
    std::ptr::without_provenance_mut(index + 1)
}

fn index_of(ptr: *mut c_void) -> usize {
    ptr.addr().wrapping_sub(1)
}

impl Heap {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
            roots: Vec::new(),
            fields: HashMap::new(),
            collect_on_alloc: false,
            null_strings: false,
            stats: Stats::default(),
            text: CString::default(),
        }
    }

    fn alloc(&mut self, surd: Surd) -> *mut c_void {
        if self.collect_on_alloc {
            self.collect();
        }
        self.stats.allocations += 1;
        self.objects.push(Some(surd));
        self.roots.push(0);
        handle_of(self.objects.len() - 1)
    }

    fn get(&mut self, ptr: *mut c_void) -> Option<Surd> {
        match self.objects.get(index_of(ptr)) {
            Some(Some(surd)) => Some(surd.clone()),
            _ => {
                self.stats.use_after_free += 1;
                None
            }
        }
    }

    fn is_live(&self, index: usize) -> bool {
        matches!(self.objects.get(index), Some(Some(_)))
    }

    fn collect(&mut self) {
        self.stats.collections += 1;
        for (slot, roots) in self.objects.iter_mut().zip(&self.roots) {
            if slot.is_some() && *roots == 0 {
                *slot = None;
                self.stats.freed += 1;
            }
        }
    }

    fn protect(&mut self, ptr: *mut c_void) {
        let index = index_of(ptr);
        if !self.is_live(index) {
            self.stats.use_after_free += 1;
            return;
        }
        self.roots[index] += 1;
        self.stats.protects += 1;
    }

    fn release(&mut self, ptr: *mut c_void) {
        let index = index_of(ptr);
        if !self.is_live(index) {
            self.stats.use_after_free += 1;
            return;
        }
        if self.roots[index] == 0 {
            self.stats.double_releases += 1;
            return;
        }
        self.roots[index] -= 1;
        self.stats.releases += 1;
    }
}

fn with_heap<R>(f: impl FnOnce(&mut Heap) -> R) -> R {
    HEAP.with(|heap| f(&mut heap.borrow_mut()))
}

/// Runs `f` against the heap and allocates its result; `None` becomes null.
fn produce(f: impl FnOnce(&mut Heap) -> Option<Surd>) -> *mut c_void {
    with_heap(|heap| match f(heap) {
        Some(surd) => heap.alloc(surd),
        None => std::ptr::null_mut(),
    })
}

fn unary(h: *mut c_void, f: impl FnOnce(&Surd) -> Option<Surd>) -> *mut c_void {
    produce(|heap| f(&heap.get(h)?))
}

fn binary(
    x: *mut c_void,
    y: *mut c_void,
    f: impl FnOnce(&Surd, &Surd) -> Option<Surd>,
) -> *mut c_void {
    produce(|heap| {
        let x = heap.get(x)?;
        let y = heap.get(y)?;
        if x.field != y.field {
            return None;
        }
        f(&x, &y)
    })
}

fn query<R>(h: *mut c_void, fallback: R, f: impl FnOnce(&Surd) -> R) -> R {
    with_heap(|heap| heap.get(h)).as_ref().map_or(fallback, f)
}

impl Surd {
    fn with(&self, a: BigRational, b: BigRational) -> Surd {
        Surd {
            a,
            b,
            ..self.clone()
        }
    }

    fn add(&self, o: &Surd) -> Surd {
        self.with(&self.a + &o.a, &self.b + &o.b)
    }

    fn sub(&self, o: &Surd) -> Surd {
        self.with(&self.a - &o.a, &self.b - &o.b)
    }

    fn neg(&self) -> Surd {
        self.with(-&self.a, -&self.b)
    }

    fn mul(&self, o: &Surd) -> Surd {
        let d = rat(self.d);
        self.with(
            &self.a * &o.a + d * &self.b * &o.b,
            &self.a * &o.b + &self.b * &o.a,
        )
    }

    fn inv(&self) -> Option<Surd> {
        let norm = &self.a * &self.a - rat(self.d) * &self.b * &self.b;
        if norm.is_zero() {
            return None;
        }
        Some(self.with(&self.a / &norm, -&self.b / &norm))
    }

    fn pow(&self, exponent: i64) -> Option<Surd> {
        let mut base = if exponent < 0 { self.inv()? } else { self.clone() };
        let mut e = exponent.unsigned_abs();
        let mut acc = self.with(rat(1), rat(0));
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base);
            }
            base = base.mul(&base);
            e >>= 1;
        }
        Some(acc)
    }

    fn sign(&self) -> i64 {
        let sa = sign_of(&self.a);
        let sb = sign_of(&self.b);
        if sa == 0 || sb == 0 || sa == sb {
            return if sa != 0 { sa } else { sb };
        }
        let a2 = &self.a * &self.a;
        let db2 = rat(self.d) * &self.b * &self.b;
        sa * sign_of(&(a2 - db2))
    }

    fn render(&self) -> String {
        let root = format!("√{}", self.d);
        let surd = if self.b.is_one() {
            root
        } else if (-&self.b).is_one() {
            format!("-{root}")
        } else {
            format!("{}{root}", self.b)
        };
        match (self.a.is_zero(), self.b.is_zero()) {
            (_, true) => self.a.to_string(),
            (true, false) => surd,
            (false, false) if self.b.is_positive() => format!("{}+{surd}", self.a),
            (false, false) => format!("{}{surd}", self.a),
        }
    }
}

fn sign_of(r: &BigRational) -> i64 {
    if r.is_positive() {
        1
    } else if r.is_negative() {
        -1
    } else {
        0
    }
}

unsafe extern "C" fn init(field: i64, value: i64) -> *mut c_void {
    produce(|heap| {
        let d = *heap.fields.get(&field)?;
        Some(Surd {
            field,
            d,
            a: rat(value),
            b: rat(0),
        })
    })
}

unsafe extern "C" fn init_from_rational(
    field: i64,
    numerator: RawBigInt,
    denominator: RawBigInt,
) -> *mut c_void {
    let (n, m) = unsafe { (numerator.to_bigint(), denominator.to_bigint()) };
    if m.is_zero() {
        return std::ptr::null_mut();
    }
    produce(|heap| {
        let d = *heap.fields.get(&field)?;
        Some(Surd {
            field,
            d,
            a: BigRational::new(n, m),
            b: rat(0),
        })
    })
}

unsafe extern "C" fn copy(h: *mut c_void) -> *mut c_void {
    unary(h, |x| Some(x.clone()))
}

unsafe extern "C" fn protect(h: *mut c_void) {
    with_heap(|heap| heap.protect(h));
}

unsafe extern "C" fn release(h: *mut c_void) {
    with_heap(|heap| heap.release(h));
}

unsafe extern "C" fn add(x: *mut c_void, y: *mut c_void) -> *mut c_void {
    binary(x, y, |x, y| Some(x.add(y)))
}

unsafe extern "C" fn sub(x: *mut c_void, y: *mut c_void) -> *mut c_void {
    binary(x, y, |x, y| Some(x.sub(y)))
}

unsafe extern "C" fn mul(x: *mut c_void, y: *mut c_void) -> *mut c_void {
    binary(x, y, |x, y| Some(x.mul(y)))
}

unsafe extern "C" fn div(x: *mut c_void, y: *mut c_void) -> *mut c_void {
    binary(x, y, |x, y| Some(x.mul(&y.inv()?)))
}

unsafe extern "C" fn pow(h: *mut c_void, exponent: i64) -> *mut c_void {
    unary(h, |x| x.pow(exponent))
}

unsafe extern "C" fn negate(h: *mut c_void) -> *mut c_void {
    unary(h, |x| Some(x.neg()))
}

unsafe extern "C" fn abs(h: *mut c_void) -> *mut c_void {
    unary(h, |x| Some(if x.sign() < 0 { x.neg() } else { x.clone() }))
}

unsafe extern "C" fn cmp(x: *mut c_void, y: *mut c_void) -> i64 {
    with_heap(|heap| match (heap.get(x), heap.get(y)) {
        (Some(x), Some(y)) => x.sub(&y).sign(),
        _ => 0,
    })
}

unsafe extern "C" fn to_string(h: *mut c_void) -> *const c_char {
    with_heap(|heap| {
        if heap.null_strings {
            return std::ptr::null();
        }
        let text = heap.get(h).map(|x| x.render()).unwrap_or_default();
        heap.text = CString::new(text).unwrap_or_default();
        heap.text.as_ptr()
    })
}

unsafe extern "C" fn is_zero(h: *mut c_void) -> bool {
    query(h, false, |x| x.a.is_zero() && x.b.is_zero())
}

unsafe extern "C" fn is_one(h: *mut c_void) -> bool {
    query(h, false, |x| x.a.is_one() && x.b.is_zero())
}

unsafe extern "C" fn sign(h: *mut c_void) -> i64 {
    query(h, 0, Surd::sign)
}

/// Full operation table of the mock field.
pub fn table() -> RawFieldTable {
    RawFieldTable {
        init: Some(init),
        init_from_rational: Some(init_from_rational),
        copy: Some(copy),
        protect: Some(protect),
        release: Some(release),
        add: Some(add),
        sub: Some(sub),
        mul: Some(mul),
        div: Some(div),
        pow: Some(pow),
        negate: Some(negate),
        cmp: Some(cmp),
        to_string: Some(to_string),
        from_string: None,
        is_zero: Some(is_zero),
        is_one: Some(is_one),
        is_inf: None,
        sign: Some(sign),
        abs: Some(abs),
    }
}

/// Register Q(sqrt d) under `id`.
pub fn install(registry: &mut FieldRegistry, id: i64, d: i64) -> Rc<FieldDescriptor> {
    install_table(registry, id, d, table())
}

/// Like [`install`], without the native `abs` slot.
pub fn install_without_abs(registry: &mut FieldRegistry, id: i64, d: i64) -> Rc<FieldDescriptor> {
    let table = RawFieldTable {
        abs: None,
        ..table()
    };
    install_table(registry, id, d, table)
}

fn install_table(
    registry: &mut FieldRegistry,
    id: i64,
    d: i64,
    table: RawFieldTable,
) -> Rc<FieldDescriptor> {
    with_heap(|heap| heap.fields.insert(id, d));
    unsafe { registry.register(FieldId(id), table) }.unwrap()
}

/// Allocate `a + b·sqrt(d)` in `field` and root it for the caller.
pub fn surd(field: i64, a: i64, b: i64) -> ForeignHandle {
    surd_q(field, rat(a), rat(b))
}

pub fn surd_q(field: i64, a: BigRational, b: BigRational) -> ForeignHandle {
    let raw = with_heap(|heap| {
        let d = heap.fields[&field];
        let raw = heap.alloc(Surd { field, d, a, b });
        heap.protect(raw);
        raw
    });
    ForeignHandle::new(raw).unwrap()
}

/// Drop the caller's root on a handle made by [`surd`].
pub fn unroot(h: ForeignHandle) {
    with_heap(|heap| heap.release(h.as_ptr()));
}

/// Coefficients `(a, b)` of a live handle.
pub fn coefficients(h: ForeignHandle) -> Option<(BigRational, BigRational)> {
    with_heap(|heap| heap.get(h.as_ptr())).map(|x| (x.a, x.b))
}

pub fn set_collect_on_alloc(on: bool) {
    with_heap(|heap| heap.collect_on_alloc = on);
}

pub fn set_null_strings(on: bool) {
    with_heap(|heap| heap.null_strings = on);
}

pub fn collect() {
    with_heap(Heap::collect);
}

pub fn stats() -> Stats {
    with_heap(|heap| heap.stats)
}

pub fn live_objects() -> usize {
    with_heap(|heap| heap.objects.iter().filter(|o| o.is_some()).count())
}

pub fn rooted_objects() -> usize {
    with_heap(|heap| {
        heap.objects
            .iter()
            .zip(&heap.roots)
            .filter(|(o, r)| o.is_some() && **r > 0)
            .count()
    })
}

/// Fresh heap for the current thread; registered `d` values are kept.
pub fn reset() {
    with_heap(|heap| {
        let fields = std::mem::take(&mut heap.fields);
        *heap = Heap::new();
        heap.fields = fields;
    });
}

pub fn q(n: i64, d: i64) -> BigRational {
    BigRational::new(n.into(), d.into())
}
