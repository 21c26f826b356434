// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared test types.

#![allow(dead_code)]

use hdds_reflect::{
    reflect_enum, reflect_member, reflect_parent, ClassBuilder, Poly, TypeDescriptor, TypeInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Color {
    #[default]
    Red = 0,
    Green = 5,
    Blue = -3,
}

impl TypeInfo for Color {
    fn type_descriptor() -> TypeDescriptor {
        reflect_enum!(Color as i32 { Red, Green, Blue })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl TypeInfo for Point {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Point>::new("Point")
            .member(reflect_member!(Point, x))
            .member(reflect_member!(Point, y))
            .with_factory()
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Shape {
    pub name: String,
    pub color: Color,
}

impl TypeInfo for Shape {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Shape>::new("Shape")
            .member(reflect_member!(Shape, name))
            .member(reflect_member!(Shape, color))
            .with_factory()
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Circle {
    pub shape: Shape,
    pub radius: f64,
}

impl TypeInfo for Circle {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Circle>::new("Circle")
            .parent(reflect_parent!(Circle, shape))
            .member(reflect_member!(Circle, radius))
            .with_factory()
            .build()
    }
}

/// Unrelated to `Shape`.
#[derive(Debug, Default, PartialEq)]
pub struct Label {
    pub text: String,
}

impl TypeInfo for Label {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Label>::new("Label")
            .member(reflect_member!(Label, text))
            .with_factory()
            .build()
    }
}

#[derive(Debug, Default)]
pub struct Drawing {
    pub title: String,
    pub shapes: Vec<Poly<Shape>>,
    pub background: Poly<Shape>,
}

impl TypeInfo for Drawing {
    fn type_descriptor() -> TypeDescriptor {
        ClassBuilder::<Drawing>::new("Drawing")
            .member(reflect_member!(Drawing, title))
            .member(reflect_member!(Drawing, shapes, "owned"))
            .member(reflect_member!(Drawing, background, "owned"))
            .build()
    }
}
